use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Column names of a history file, in write order.
pub const HISTORY_HEADER: [&str; 7] = [
    "Date",
    "Time",
    "Open_Price",
    "Close_Price",
    "One_Year_Target_Price",
    "PE_Ratio",
    "Day_Change",
];

/// Values scraped from one quote page, kept exactly as the page renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSnapshot {
    pub open_price: String,
    pub close_price: String,
    pub target_price: String,
    pub pe_ratio: String,
    pub day_change: String,
}

/// One row of a history file.
///
/// Field order and the serde names below are the file schema; both the
/// fetch and report phases go through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Open_Price")]
    pub open_price: String,
    #[serde(rename = "Close_Price")]
    pub close_price: String,
    #[serde(rename = "One_Year_Target_Price")]
    pub target_price: String,
    #[serde(rename = "PE_Ratio")]
    pub pe_ratio: String,
    #[serde(rename = "Day_Change")]
    pub day_change: String,
}

impl MetricRecord {
    pub fn new(captured_at: NaiveDateTime, snapshot: QuoteSnapshot) -> Self {
        Self {
            date: captured_at.date(),
            time: captured_at.time(),
            open_price: snapshot.open_price,
            close_price: snapshot.close_price,
            target_price: snapshot.target_price,
            pe_ratio: snapshot.pe_ratio,
            day_change: snapshot.day_change,
        }
    }
}
