pub mod config;
pub mod errors;
pub mod history;
pub mod mail;
pub mod models;
pub mod report;
pub mod scrapers;
pub mod services;
pub mod util;

// commonly used types
pub use config::{Config, FailurePolicy, MailConfig};
pub use errors::{Result, WatchError};
pub use history::HistoryStore;
pub use models::metric::{MetricRecord, QuoteSnapshot, HISTORY_HEADER};
pub use services::watch_service::{ReportArtifacts, RunSummary, WatchService};
