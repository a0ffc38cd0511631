use crate::errors::Result;
use crate::models::metric::QuoteSnapshot;
use async_trait::async_trait;

/// Base trait for quote page scrapers
#[async_trait]
pub trait QuoteScraper {
    /// Short name of the quote source, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch the current metrics for one ticker
    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteSnapshot>;
}
