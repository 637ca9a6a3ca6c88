use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use history_model::{DateRange, HistoryEntry, HistoryProvider, Interval, ProviderError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::fetch::Sleeper;

type Script = Box<dyn Fn(usize) -> Result<Vec<HistoryEntry>, ProviderError> + Send + Sync>;

/// Provider answering from a script keyed by the 1-based call number.
pub struct StubProvider {
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, DateRange, Interval)>>,
}

impl StubProvider {
    pub fn new(
        script: impl Fn(usize) -> Result<Vec<HistoryEntry>, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        StubProvider {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self::new(|call| Err(ProviderError::new(format!("provider failure {}", call))))
    }

    pub fn failing_then(failures: usize, history: Vec<HistoryEntry>) -> Self {
        Self::new(move |call| match call <= failures {
            true => Err(ProviderError::new(format!("provider failure {}", call))),
            false => Ok(history.clone()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, DateRange, Interval)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryProvider for StubProvider {
    async fn get_history(
        &self,
        ticker: &str,
        range: DateRange,
        interval: Interval,
    ) -> Result<Vec<HistoryEntry>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .lock()
            .unwrap()
            .push((ticker.to_string(), range, interval));
        (self.script)(call)
    }
}

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn sample_history() -> Vec<HistoryEntry> {
    vec![
        HistoryEntry {
            time: Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap(),
            intraday: false,
            open: 187.15,
            high: 188.44,
            low: 183.89,
            close: 185.64,
            volume: 82488700,
            dividends: 0.0,
            stock_splits: 0.0,
        },
        HistoryEntry {
            time: Utc.with_ymd_and_hms(2024, 1, 3, 5, 0, 0).unwrap(),
            intraday: false,
            open: 184.22,
            high: 185.88,
            low: 183.43,
            close: 184.25,
            volume: 58414500,
            dividends: 0.0,
            stock_splits: 0.0,
        },
    ]
}
