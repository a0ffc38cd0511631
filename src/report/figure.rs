use crate::errors::{Result, WatchError};
use crate::models::metric::MetricRecord;
use chrono::NaiveDate;

pub const FIGURE_WIDTH: u32 = 600;
pub const FIGURE_HEIGHT: u32 = 600;
/// Gap between stacked panels, as a fraction of the figure height.
pub const VERTICAL_SPACING: f64 = 0.07;

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Price (CDN)";

pub const OPEN_COLOR: [u8; 3] = [0x6d, 0x95, 0xd6];
pub const CLOSE_COLOR: [u8; 3] = [0x28, 0x45, 0x75];
pub const TARGET_COLOR: [u8; 3] = [0xe3, 0xb2, 0x40];

/// One line of a panel. A `None` value is a cell that did not parse as a price.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: [u8; 3],
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl Series {
    fn from_column<F>(name: String, color: [u8; 3], records: &[MetricRecord], column: F) -> Self
    where
        F: Fn(&MetricRecord) -> &str,
    {
        let points = records
            .iter()
            .map(|r| (r.date, price_value(column(r))))
            .collect();
        Self { name, color, points }
    }

    pub fn color_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.color[0], self.color[1], self.color[2])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub series: Vec<Series>,
}

impl Panel {
    /// Open, close and analyst target lines for one ticker.
    pub fn from_history(ticker: &str, records: &[MetricRecord]) -> Self {
        let series = vec![
            Series::from_column(format!("{} Open Price", ticker), OPEN_COLOR, records, |r| r.open_price.as_str()),
            Series::from_column(format!("{} Close Price", ticker), CLOSE_COLOR, records, |r| r.close_price.as_str()),
            Series::from_column(format!("{} Analyst Target", ticker), TARGET_COLOR, records, |r| r.target_price.as_str()),
        ];
        Self {
            title: ticker.to_string(),
            series,
        }
    }

    /// Smallest and largest plotted value across all series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|(_, v)| *v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Stacked line chart, one panel per ticker, sharing the date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn build(title: &str, histories: &[(String, Vec<MetricRecord>)]) -> Result<Self> {
        if histories.is_empty() {
            return Err(WatchError::ChartError("no tickers to plot".to_string()));
        }
        let panels = histories
            .iter()
            .map(|(ticker, records)| Panel::from_history(ticker, records))
            .collect();
        Ok(Self {
            title: title.to_string(),
            panels,
        })
    }

    /// The bottom panel carries the date axis label.
    pub fn x_label_panel(&self) -> usize {
        self.panels.len().saturating_sub(1)
    }

    /// Panel carrying the price axis label: 1-based row `len / 2`, which is
    /// only roughly the middle. A single panel gets it directly.
    pub fn y_label_panel(&self) -> usize {
        (self.panels.len() / 2).max(1) - 1
    }

    /// Earliest and latest date across every series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.panels
            .iter()
            .flat_map(|p| p.series.iter())
            .flat_map(|s| s.points.iter().map(|(d, _)| *d))
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Vertical extent `[bottom, top]` of each panel in paper coordinates, top panel first.
    pub fn panel_domains(&self) -> Vec<(f64, f64)> {
        let n = self.panels.len();
        if n == 0 {
            return Vec::new();
        }
        let height = (1.0 - VERTICAL_SPACING * (n as f64 - 1.0)) / n as f64;
        (0..n)
            .map(|i| {
                let top = 1.0 - i as f64 * (height + VERTICAL_SPACING);
                ((top - height).max(0.0), top)
            })
            .collect()
    }
}

/// Read a scraped price cell as a number: `"1,234.50"` -> 1234.5.
///
/// Placeholders such as `N/A` yield `None`.
pub fn price_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
