use crate::errors::{Result, WatchError};
use crate::models::metric::{MetricRecord, HISTORY_HEADER};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Per-ticker CSV history files living in one directory.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `stock_<ticker>.csv` inside the store directory.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("stock_{}.csv", ticker))
    }

    pub fn exists(&self, ticker: &str) -> bool {
        self.path_for(ticker).exists()
    }

    /// Append one record, writing the header first when the file is new or empty.
    pub fn append(&self, ticker: &str, record: &MetricRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(ticker);
        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        if needs_header {
            info!("Created history file {}", path.display());
        }
        debug!("Appended {} row to {}", ticker, path.display());
        Ok(path)
    }

    /// Read every record of a ticker's history, oldest first.
    pub fn read(&self, ticker: &str) -> Result<Vec<MetricRecord>> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(WatchError::MissingHistory {
                ticker: ticker.to_string(),
                path: path.display().to_string(),
            });
        }

        let malformed = |reason: String| WatchError::MalformedHistory {
            path: path.display().to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new().from_path(&path)?;
        let headers = reader.headers().map_err(|e| malformed(e.to_string()))?.clone();
        if !headers.iter().eq(HISTORY_HEADER.iter().copied()) {
            return Err(malformed(format!(
                "header is {:?}, expected {:?}",
                headers.iter().collect::<Vec<_>>(),
                HISTORY_HEADER
            )));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<MetricRecord>() {
            records.push(row.map_err(|e| malformed(e.to_string()))?);
        }

        debug!("Read {} rows from {}", records.len(), path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metric::QuoteSnapshot;
    use chrono::NaiveDate;

    fn record(day: u32, close: &str) -> MetricRecord {
        let at = NaiveDate::from_ymd_opt(2021, 8, day)
            .unwrap()
            .and_hms_micro_opt(16, 5, 12, 250_000)
            .unwrap();
        MetricRecord::new(
            at,
            QuoteSnapshot {
                open_price: "10.00".to_string(),
                close_price: close.to_string(),
                target_price: "12.00".to_string(),
                pe_ratio: "N/A".to_string(),
                day_change: "+0.50 (+5.00%)".to_string(),
            },
        )
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());

        store.append("IFP", &record(10, "10.50")).unwrap();
        store.append("IFP", &record(11, "10.75")).unwrap();

        let text = fs::read_to_string(store.path_for("IFP")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HISTORY_HEADER.join(","));
        assert_eq!(lines[1], "2021-08-10,16:05:12.250,10.00,10.50,12.00,N/A,+0.50 (+5.00%)");
        assert_eq!(text.matches("Open_Price").count(), 1);
    }

    #[test]
    fn read_returns_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        for day in 10..15 {
            store.append("CFP", &record(day, "10.50")).unwrap();
        }

        let rows = store.read("CFP").unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], record(10, "10.50"));
        assert_eq!(rows[4].date, NaiveDate::from_ymd_opt(2021, 8, 14).unwrap());
    }

    #[test]
    fn reads_rows_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        fs::write(
            store.path_for("WFG"),
            "Date,Time,Open_Price,Close_Price,One_Year_Target_Price,PE_Ratio,Day_Change\n\
             2021-08-10,15:59:01.734512,95.12,96.40,118.50,4.12,+1.28 (+1.35%)\n",
        )
        .unwrap();

        let rows = store.read("WFG").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close_price, "96.40");
        assert_eq!(rows[0].pe_ratio, "4.12");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        assert!(matches!(store.read("IFP"), Err(WatchError::MissingHistory { .. })));
    }

    #[test]
    fn reordered_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        fs::write(
            store.path_for("IFP"),
            "Date,Time,Close_Price,Open_Price,One_Year_Target_Price,PE_Ratio,Day_Change\n",
        )
        .unwrap();
        assert!(matches!(store.read("IFP"), Err(WatchError::MalformedHistory { .. })));
    }

    #[test]
    fn short_row_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        fs::write(
            store.path_for("IFP"),
            "Date,Time,Open_Price,Close_Price,One_Year_Target_Price,PE_Ratio,Day_Change\n\
             2021-08-10,15:59:01,95.12\n",
        )
        .unwrap();
        assert!(matches!(store.read("IFP"), Err(WatchError::MalformedHistory { .. })));
    }
}
