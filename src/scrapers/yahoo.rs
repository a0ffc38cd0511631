use crate::config::Config;
use crate::errors::{Result, WatchError};
use crate::models::metric::QuoteSnapshot;
use crate::scrapers::base::QuoteScraper;
use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Cell holding the day's open price.
static OPEN_CELL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"td[class="Ta(end) Fw(600) Lh(14px)"]"#).expect("Failed to parse open price selector")
});

/// Header block with the last price and the day change.
static PRICE_HEADER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class="D(ib) Mend(20px)"]"#).expect("Failed to parse price header selector")
});

/// Right-hand summary table (market cap, P/E, target estimate, ...).
static SUMMARY_TABLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"div[class="D(ib) W(1/2) Bxz(bb) Pstart(12px) Va(t) ie-7_D(i) ie-7_Pos(a) smartphone_D(b) smartphone_W(100%) smartphone_Pstart(0px) smartphone_BdB smartphone_Bdc($seperatorColor)"]"#,
    )
    .expect("Failed to parse summary table selector")
});

/// Last row of the summary table: "1y Target Est".
static TARGET_ROW: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"tr[class="Bxz(bb) Bdbw(1px) Bdbs(s) Bdc($seperatorColor) H(36px) Bdbw(0)!"]"#)
        .expect("Failed to parse target row selector")
});

static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("Failed to parse span selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("Failed to parse td selector"));

/// Index of the P/E value among the summary table cells.
const PE_CELL_INDEX: usize = 5;

/// Yahoo Finance quote page scraper
pub struct YahooScraper {
    client: Client,
    base_url: String,
    exchange_suffix: String,
}

impl YahooScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(WatchError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            exchange_suffix: config.exchange_suffix.clone(),
        })
    }

    fn quote_url(&self, ticker: &str) -> String {
        format!("{}{}{}", self.base_url, ticker, self.exchange_suffix)
    }
}

#[async_trait]
impl QuoteScraper for YahooScraper {
    fn source_name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteSnapshot> {
        let url = self.quote_url(ticker);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        info!("processing: {}, status: {}", ticker, status.as_u16());

        if status != StatusCode::OK {
            return Err(WatchError::HttpStatus {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_quote_page(&body, ticker)
    }
}

/// Pull the five tracked values out of a quote page.
///
/// Text is returned exactly as rendered, currency and percent signs included.
pub fn parse_quote_page(html: &str, ticker: &str) -> Result<QuoteSnapshot> {
    let document = Html::parse_document(html);
    let missing = |field: &'static str| WatchError::Parse {
        ticker: ticker.to_string(),
        field,
    };

    let open_cell = document.select(&OPEN_CELL).next().ok_or_else(|| missing("open price cell"))?;
    let open_price = nth_text(open_cell, &SPAN, 0).ok_or_else(|| missing("open price"))?;

    let header = document.select(&PRICE_HEADER).next().ok_or_else(|| missing("price header"))?;
    let close_price = nth_text(header, &SPAN, 0).ok_or_else(|| missing("close price"))?;
    let day_change = nth_text(header, &SPAN, 1).ok_or_else(|| missing("day change"))?;

    let summary = document.select(&SUMMARY_TABLE).next().ok_or_else(|| missing("summary table"))?;
    let target_row = summary.select(&TARGET_ROW).next().ok_or_else(|| missing("target row"))?;
    let target_price = nth_text(target_row, &SPAN, 1).ok_or_else(|| missing("one year target"))?;
    let pe_ratio = nth_text(summary, &CELL, PE_CELL_INDEX).ok_or_else(|| missing("P/E ratio"))?;

    Ok(QuoteSnapshot {
        open_price,
        close_price,
        target_price,
        pe_ratio,
        day_change,
    })
}

fn nth_text(scope: ElementRef<'_>, selector: &Selector, index: usize) -> Option<String> {
    scope.select(selector).nth(index).map(|el| el.text().collect::<String>())
}
