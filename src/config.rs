use crate::errors::{Result, WatchError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/92.0.4515.159 Safari/537.36";

/// What the fetch phase does when a single ticker fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing ticker.
    FailFast,
    /// Record the failure in the run summary and move on.
    Continue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub recipient: String,
    pub sender: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    /// Name of the environment variable holding the SMTP password.
    pub password_env: String,
    pub subject_prefix: String,
    /// `{date}` is replaced with the report date.
    pub body_template: String,
}

impl MailConfig {
    pub fn new() -> Self {
        Self {
            enabled: true,
            recipient: String::new(),
            sender: String::new(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            password_env: "STOCK_WATCH_SMTP_PASSWORD".to_string(),
            subject_prefix: "Lumber Stocks".to_string(),
            body_template: "Here are the lumber stock prices for {date}".to_string(),
        }
    }

    pub fn subject_for(&self, date: &str) -> String {
        format!("{} {}", self.subject_prefix, date)
    }

    pub fn body_for(&self, date: &str) -> String {
        self.body_template.replace("{date}", date)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tickers: Vec<String>,
    pub figure_title: String,
    pub base_url: String,
    pub exchange_suffix: String,
    pub user_agent: String,
    pub request_timeout_secs: Option<u64>,
    pub history_dir: PathBuf,
    pub graphs_dir: PathBuf,
    pub artifact_stem: String,
    pub failure_policy: FailurePolicy,
    pub show_chart: bool,
    pub mail: MailConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            tickers: vec!["IFP".to_string(), "CFP".to_string(), "WFG".to_string()],
            figure_title: "Lumber Stock Price and Analyst Rating".to_string(),
            base_url: "https://ca.finance.yahoo.com/quote/".to_string(),
            exchange_suffix: ".TO".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            history_dir: PathBuf::from("."),
            graphs_dir: PathBuf::from("stockGraphs"),
            artifact_stem: "Lumber_Stock_Prices".to_string(),
            failure_policy: FailurePolicy::FailFast,
            show_chart: false,
            mail: MailConfig::new(),
        }
    }

    /// Load a TOML config file; keys left out keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&contents)?;
        for ticker in &mut config.tickers {
            *ticker = ticker.trim().to_string();
        }
        Ok(config)
    }

    pub fn with_tickers<S: AsRef<str>>(mut self, tickers: &[S]) -> Self {
        self.tickers = tickers.iter().map(|t| t.as_ref().trim().to_string()).collect();
        self
    }

    pub fn with_history_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.history_dir = dir.into();
        self
    }

    pub fn with_graphs_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.graphs_dir = dir.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_show_chart(mut self, show: bool) -> Self {
        self.show_chart = show;
        self
    }

    pub fn with_mail_enabled(mut self, enabled: bool) -> Self {
        self.mail.enabled = enabled;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(WatchError::ConfigError("ticker list is empty".to_string()));
        }
        if let Some(pos) = self.tickers.iter().position(|t| t.trim().is_empty()) {
            return Err(WatchError::ConfigError(format!("ticker #{} is empty", pos + 1)));
        }
        // tickers end up verbatim in the quote URL and the history file name
        if let Some(t) = self.tickers.iter().find(|t| t.trim() != t.as_str()) {
            return Err(WatchError::ConfigError(format!("ticker {:?} has surrounding whitespace", t)));
        }
        if self.mail.enabled && self.mail.recipient.trim().is_empty() {
            return Err(WatchError::ConfigError("mail recipient is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
