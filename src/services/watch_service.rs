use crate::config::{Config, FailurePolicy};
use crate::errors::{Result, WatchError};
use crate::history::HistoryStore;
use crate::mail::{Dispatch, Mailer};
use crate::models::metric::MetricRecord;
use crate::report::{html, plot, Figure};
use crate::scrapers::base::QuoteScraper;
use crate::util;
use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of fetching one ticker.
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticker: String,
    pub result: Result<MetricRecord>,
}

/// Per-ticker outcomes of one fetch phase, in ticker order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<FetchOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> Vec<&FetchOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Files written by one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub png: PathBuf,
    pub html: PathBuf,
}

/// Fetch phase then report phase, wired to a scraper and a mailer.
pub struct WatchService {
    config: Config,
    scraper: Arc<dyn QuoteScraper + Send + Sync>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    history: HistoryStore,
}

impl WatchService {
    pub fn new(
        config: Config,
        scraper: Arc<dyn QuoteScraper + Send + Sync>,
        mailer: Arc<dyn Mailer + Send + Sync>,
    ) -> Self {
        let history = HistoryStore::new(&config.history_dir);
        Self {
            config,
            scraper,
            mailer,
            history,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Scrape one ticker and append the record to its history file.
    pub async fn fetch_ticker(&self, ticker: &str, captured_at: NaiveDateTime) -> Result<MetricRecord> {
        let snapshot = self.scraper.fetch_quote(ticker).await?;
        let record = MetricRecord::new(captured_at, snapshot);
        info!(
            "{} | {} | {} | {} | {} | {} | {}",
            record.date,
            record.time,
            record.open_price,
            record.close_price,
            record.target_price,
            record.pe_ratio,
            record.day_change
        );
        self.history.append(ticker, &record)?;
        Ok(record)
    }

    /// Fetch every configured ticker in order, all stamped with `captured_at`.
    ///
    /// Under `FailFast` the first failure aborts the phase; under `Continue`
    /// it is recorded in the summary and the next ticker is tried.
    pub async fn fetch_all(&self, captured_at: NaiveDateTime) -> Result<RunSummary> {
        info!(
            "Fetching {} tickers from {}",
            self.config.tickers.len(),
            self.scraper.source_name()
        );

        let mut summary = RunSummary::default();
        for ticker in &self.config.tickers {
            match self.fetch_ticker(ticker, captured_at).await {
                Ok(record) => summary.outcomes.push(FetchOutcome {
                    ticker: ticker.clone(),
                    result: Ok(record),
                }),
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        error!("Fetch failed for {}: {}", ticker, e);
                        return Err(WatchError::Fetch {
                            ticker: ticker.clone(),
                            source: Box::new(e),
                        });
                    }
                    FailurePolicy::Continue => {
                        warn!("Fetch failed for {}: {}", ticker, e);
                        summary.outcomes.push(FetchOutcome {
                            ticker: ticker.clone(),
                            result: Err(e),
                        });
                    }
                },
            }
        }

        info!(
            "Fetched {} of {} tickers",
            summary.succeeded(),
            summary.outcomes.len()
        );
        Ok(summary)
    }

    /// Build the chart from every history file, write both artifacts and mail them.
    ///
    /// All history files are read before anything is written, so a missing or
    /// malformed file leaves no artifact behind.
    pub async fn report(&self, date: NaiveDate) -> Result<ReportArtifacts> {
        if self.config.tickers.is_empty() {
            return Err(WatchError::ConfigError("ticker list is empty".to_string()));
        }

        let mut histories = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            let records = self.history.read(ticker)?;
            histories.push((ticker.clone(), records));
        }
        let figure = Figure::build(&self.config.figure_title, &histories)?;
        let page = html::render_html(&figure)?;

        std::fs::create_dir_all(&self.config.graphs_dir)?;
        let artifacts = ReportArtifacts {
            png: util::artifact_path(&self.config.graphs_dir, &self.config.artifact_stem, date, "png"),
            html: util::artifact_path(&self.config.graphs_dir, &self.config.artifact_stem, date, "html"),
        };
        std::fs::write(&artifacts.html, page)?;
        plot::render_png(&figure, &artifacts.png, date)?;
        info!(
            "Report written: {} and {}",
            artifacts.png.display(),
            artifacts.html.display()
        );

        if self.config.show_chart {
            util::open_in_viewer(&artifacts.html);
        }

        let stamp = util::date_stamp(date);
        let dispatch = Dispatch {
            to: self.config.mail.recipient.clone(),
            subject: self.config.mail.subject_for(&stamp),
            body: self.config.mail.body_for(&stamp),
            attachments: vec![artifacts.png.clone(), artifacts.html.clone()],
        };
        self.mailer.send(&dispatch).await?;

        Ok(artifacts)
    }

    /// The whole pass: fetch every ticker, then report once.
    pub async fn run(&self, now: NaiveDateTime) -> Result<(RunSummary, ReportArtifacts)> {
        let summary = self.fetch_all(now).await?;
        let artifacts = self.report(now.date()).await?;
        Ok((summary, artifacts))
    }
}
