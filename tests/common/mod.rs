#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use stock_watch::errors::{Result, WatchError};
use stock_watch::mail::{Dispatch, Mailer};
use stock_watch::models::metric::QuoteSnapshot;
use stock_watch::scrapers::base::QuoteScraper;
use stock_watch::scrapers::yahoo::parse_quote_page;

pub const QUOTE_PAGE: &str = include_str!("../fixtures/quote_page.html");

/// Serves the fixture page for every ticker except those listed as down.
pub struct FixtureScraper {
    pub down: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureScraper {
    pub fn new() -> Self {
        Self {
            down: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_down(tickers: &[&str]) -> Self {
        Self {
            down: tickers.iter().map(|t| t.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl QuoteScraper for FixtureScraper {
    fn source_name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteSnapshot> {
        self.calls.lock().unwrap().push(ticker.to_string());
        if self.down.contains(ticker) {
            return Err(WatchError::HttpStatus {
                ticker: ticker.to_string(),
                status: 503,
            });
        }
        parse_quote_page(QUOTE_PAGE, ticker)
    }
}

/// Keeps every dispatch instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Dispatch>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, dispatch: &Dispatch) -> Result<()> {
        if self.fail {
            return Err(WatchError::Unknown("smtp relay refused".to_string()));
        }
        self.sent.lock().unwrap().push(dispatch.clone());
        Ok(())
    }
}

pub fn mailer() -> Arc<RecordingMailer> {
    Arc::new(RecordingMailer::default())
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 8, day)
        .unwrap()
        .and_hms_micro_opt(hour, 30, 5, 123_456)
        .unwrap()
}
