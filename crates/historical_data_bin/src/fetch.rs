use async_trait::async_trait;
use history_model::{DateRange, HistoryEntry, HistoryProvider, Interval};
use log::{debug, error, warn};
use std::time::Duration;

use crate::error::ApiError;

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Waits between provider attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the actix runtime timer, so a dropped request cancels the wait.
pub struct RuntimeSleeper;

#[async_trait]
impl Sleeper for RuntimeSleeper {
    async fn sleep(&self, duration: Duration) {
        actix_web::rt::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^attempt`, no jitter, saturating at `Duration::MAX`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub ticker: String,
    pub range: DateRange,
    pub interval: Interval,
}

/// Asks the provider for history, retrying provider errors with exponential
/// backoff. An empty answer is final.
pub async fn fetch_history(
    provider: &dyn HistoryProvider,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    query: &HistoryQuery,
) -> Result<Vec<HistoryEntry>, ApiError> {
    let mut attempt: u32 = 0;
    loop {
        debug!(
            "fetch_history | ticker: {} | range: {} | interval: {} | attempt: {}",
            query.ticker, query.range, query.interval, attempt
        );

        match provider
            .get_history(&query.ticker, query.range, query.interval)
            .await
        {
            Ok(history) if history.is_empty() => return Err(ApiError::NotFound),
            Ok(history) => return Ok(history),
            Err(e) if attempt + 1 >= policy.max_attempts => {
                error!(
                    "fetch_history | ticker: {} | giving up after {} attempts: {}",
                    query.ticker,
                    attempt + 1,
                    e
                );
                return Err(ApiError::Provider(e));
            }
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "fetch_history | ticker: {} | attempt {}/{} failed, retrying in {}s: {}",
                    query.ticker,
                    attempt + 1,
                    policy.max_attempts,
                    delay.as_secs_f64(),
                    e
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
