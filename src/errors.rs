use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP status {status} while fetching {ticker}")]
    HttpStatus { ticker: String, status: u16 },

    #[error("Page structure changed for {ticker}: could not locate {field}")]
    Parse { ticker: String, field: &'static str },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("No history file for {ticker} at {path}")]
    MissingHistory { ticker: String, path: String },

    #[error("Malformed history file {path}: {reason}")]
    MalformedHistory { path: String, reason: String },

    #[error("Chart error: {0}")]
    ChartError(String),

    #[error("Mail address error: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Mail build error: {0}")]
    MessageError(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Fetch failed for {ticker}: {source}")]
    Fetch {
        ticker: String,
        #[source]
        source: Box<WatchError>,
    },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;

impl From<String> for WatchError {
    fn from(s: String) -> Self {
        WatchError::Unknown(s)
    }
}

impl From<&str> for WatchError {
    fn from(s: &str) -> Self {
        WatchError::Unknown(s.to_string())
    }
}
