use async_trait::async_trait;
use std::error::Error as StdError;
use thiserror::Error;

use crate::{DateRange, HistoryEntry, Interval};

/// Any failure while asking a provider for history.
///
/// The message is the underlying error's message, unchanged.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(Box<dyn StdError + Send + Sync>);

impl ProviderError {
    pub fn new<E: Into<Box<dyn StdError + Send + Sync>>>(err: E) -> Self {
        ProviderError(err.into())
    }
}

/// A source of historical prices.
///
/// `Ok(vec![])` means the provider has no data for the combination; it is an
/// answer, not a failure.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn get_history(
        &self,
        ticker: &str,
        range: DateRange,
        interval: Interval,
    ) -> Result<Vec<HistoryEntry>, ProviderError>;
}
