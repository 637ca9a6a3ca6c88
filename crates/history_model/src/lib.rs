use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

mod params;
mod provider;

pub use params::{DateRange, Interval, InvalidParameter};
pub use provider::{HistoryProvider, ProviderError};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// One time bucket of a price history.
///
/// Serialized with the provider's column names, the time index being the
/// `Date` key (or `Datetime` for intraday buckets).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub time: DateTime<Utc>,
    pub intraday: bool,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub dividends: f64,
    pub stock_splits: f64,
}

impl HistoryEntry {
    pub fn time_key(&self) -> &'static str {
        match self.intraday {
            true => "Datetime",
            false => "Date",
        }
    }

    pub fn http_date(&self) -> String {
        self.time.format(HTTP_DATE_FORMAT).to_string()
    }
}

impl Serialize for HistoryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry(self.time_key(), &self.http_date())?;
        map.serialize_entry("Open", &self.open)?;
        map.serialize_entry("High", &self.high)?;
        map.serialize_entry("Low", &self.low)?;
        map.serialize_entry("Close", &self.close)?;
        map.serialize_entry("Volume", &self.volume)?;
        map.serialize_entry("Dividends", &self.dividends)?;
        map.serialize_entry("Stock Splits", &self.stock_splits)?;
        map.end()
    }
}
