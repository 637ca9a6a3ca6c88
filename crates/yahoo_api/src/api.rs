use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use history_model::{DateRange, HistoryEntry, HistoryProvider, Interval, ProviderError};
use itertools::izip;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

pub const YAHOO_BASE_API_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum YahooError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("Invalid base url: {0}")]
    InvalidUrl(String),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<YahooError> for ProviderError {
    fn from(err: YahooError) -> Self {
        ProviderError::new(err)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponseJSON {
    chart: ChartJSON,
}

#[derive(Debug, Deserialize)]
struct ChartJSON {
    result: Option<Vec<ChartResultJSON>>,
    error: Option<ChartErrorJSON>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorJSON {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartResultJSON {
    meta: MetaJSON,
    timestamp: Vec<i64>,
    events: EventsJSON,
    indicators: IndicatorsJSON,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaJSON {
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventsJSON {
    dividends: HashMap<String, DividendJSON>,
    splits: HashMap<String, SplitJSON>,
}

#[derive(Debug, Deserialize)]
struct DividendJSON {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitJSON {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndicatorsJSON {
    quote: Vec<QuoteJSON>,
    adjclose: Vec<AdjCloseJSON>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteJSON {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdjCloseJSON {
    adjclose: Vec<Option<f64>>,
}

/// Client for the Yahoo Finance chart endpoint.
pub struct YahooAPI {
    base_url: String,
    client: reqwest::Client,
    headers: reqwest::header::HeaderMap,
}

impl YahooAPI {
    pub fn with_base_url(base_url: &str) -> Self {
        let mut reqwest_headers = reqwest::header::HeaderMap::new();
        reqwest_headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );

        YahooAPI {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            headers: reqwest_headers,
        }
    }

    pub async fn get_ticker(
        &self,
        ticker: &str,
        range: DateRange,
        interval: Interval,
    ) -> Result<Vec<HistoryEntry>, YahooError> {
        let url = self.chart_url(ticker, range, interval)?;

        debug!("get_ticker | url: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let chart = match serde_json::from_str::<ChartResponseJSON>(&body) {
            Ok(json) => json.chart,
            Err(_) if !status.is_success() => return Err(YahooError::Status(status)),
            Err(e) => return Err(YahooError::Parse(e)),
        };

        debug!("get_ticker | status: {} | ticker: {}", status, ticker);

        parse_chart(chart, interval)
    }

    fn chart_url(
        &self,
        ticker: &str,
        range: DateRange,
        interval: Interval,
    ) -> Result<reqwest::Url, YahooError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| YahooError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| YahooError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("range", range.as_str())
            .append_pair("interval", interval.as_str())
            .append_pair("events", "div,splits")
            .append_pair("includePrePost", "false");
        Ok(url)
    }
}

#[async_trait]
impl HistoryProvider for YahooAPI {
    async fn get_history(
        &self,
        ticker: &str,
        range: DateRange,
        interval: Interval,
    ) -> Result<Vec<HistoryEntry>, ProviderError> {
        Ok(self.get_ticker(ticker, range, interval).await?)
    }
}

fn parse_chart(chart: ChartJSON, interval: Interval) -> Result<Vec<HistoryEntry>, YahooError> {
    // a well-formed chart error is a definitive rejection (unknown symbol,
    // unsupported range/interval pair), not a transient failure
    if let Some(error) = chart.error {
        warn!("parse_chart | {}: {}", error.code, error.description);
        return Ok(vec![]);
    }

    let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(vec![]);
    };
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(vec![]);
    };
    let adjclose = result
        .indicators
        .adjclose
        .first()
        .map(|a| a.adjclose.as_slice())
        .unwrap_or_default();

    let intraday = interval.is_intraday();
    let gmtoffset = result.meta.gmtoffset;

    let mut history: Vec<HistoryEntry> = izip!(
        &result.timestamp,
        &quote.open,
        &quote.high,
        &quote.low,
        &quote.close,
        &quote.volume
    )
    .enumerate()
    .filter(|(_, (_, o, h, l, c, _))| o.is_some() || h.is_some() || l.is_some() || c.is_some())
    .filter_map(|(i, (t, o, h, l, c, v))| {
        let time = bucket_time(*t, gmtoffset, intraday)?;
        let (open, high, low, close) = adjust_prices(
            o.unwrap_or(f64::NAN),
            h.unwrap_or(f64::NAN),
            l.unwrap_or(f64::NAN),
            c.unwrap_or(f64::NAN),
            adjclose.get(i).copied().flatten(),
        );
        Some(HistoryEntry {
            time,
            intraday,
            open,
            high,
            low,
            close,
            volume: v.unwrap_or_default() as i64,
            dividends: 0.0,
            stock_splits: 0.0,
        })
    })
    .collect();

    for dividend in result.events.dividends.values() {
        if let Some(entry) = bucket_for_event(&mut history, dividend.date) {
            entry.dividends += dividend.amount;
        }
    }
    for split in result.events.splits.values() {
        if split.denominator == 0.0 {
            continue;
        }
        if let Some(entry) = bucket_for_event(&mut history, split.date) {
            entry.stock_splits = split.numerator / split.denominator;
        }
    }

    Ok(history)
}

/// Daily and coarser buckets start at midnight exchange time.
fn bucket_time(timestamp: i64, gmtoffset: i64, intraday: bool) -> Option<DateTime<Utc>> {
    let time = DateTime::from_timestamp(timestamp, 0)?;
    if intraday {
        return Some(time);
    }
    let offset = TimeDelta::seconds(gmtoffset);
    let local_midnight = (time + offset).date_naive().and_hms_opt(0, 0, 0)?;
    Some(local_midnight.and_utc() - offset)
}

fn adjust_prices(
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adjclose: Option<f64>,
) -> (f64, f64, f64, f64) {
    match adjclose {
        Some(adj) if close.is_finite() && close != 0.0 => {
            let ratio = adj / close;
            (open * ratio, high * ratio, low * ratio, adj)
        }
        _ => (open, high, low, close),
    }
}

/// Last bucket starting at or before the event.
fn bucket_for_event(history: &mut [HistoryEntry], timestamp: i64) -> Option<&mut HistoryEntry> {
    let time = DateTime::from_timestamp(timestamp, 0)?;
    let idx = history.partition_point(|entry| entry.time <= time);
    match idx {
        0 => None,
        _ => history.get_mut(idx - 1),
    }
}
