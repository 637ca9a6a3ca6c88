use actix_web::{HttpResponse, Responder, get, web};
use history_model::{DateRange, HistoryEntry, HistoryProvider, Interval};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ErrorResponse, MISSING_TICKER};
use crate::fetch::{self, HistoryQuery, RetryPolicy, RuntimeSleeper, Sleeper};
use crate::utils;

pub struct AppState {
    pub provider: Arc<dyn HistoryProvider>,
    pub sleeper: Arc<dyn Sleeper>,
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        AppState {
            provider,
            sleeper: Arc::new(RuntimeSleeper),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct HistoricalDataParams {
    ticker: Option<String>,
    date_range: Option<String>,
    interval: Option<String>,
}

impl HistoricalDataParams {
    /// Repeated keys keep their first value.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = HistoricalDataParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "ticker" => &mut params.ticker,
                "date_range" => &mut params.date_range,
                "interval" => &mut params.interval,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    /// Checks ticker, then date range, then interval; the first failure wins.
    fn validate(self) -> Result<HistoryQuery, ApiError> {
        let ticker = match self.ticker {
            Some(ticker) if !ticker.is_empty() => ticker,
            _ => return Err(ApiError::Validation(MISSING_TICKER.to_string())),
        };
        let range = match self.date_range {
            Some(range) => range.parse::<DateRange>()?,
            None => DateRange::default(),
        };
        let interval = match self.interval {
            Some(interval) => interval.parse::<Interval>()?,
            None => Interval::default(),
        };

        Ok(HistoryQuery {
            ticker: utils::normalize_ticker(&ticker),
            range,
            interval,
        })
    }
}

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
}

#[get("/historical-data")]
async fn get_historical_data(
    pairs: web::Query<Vec<(String, String)>>,
    state: web::Data<AppState>,
) -> Result<web::Json<Vec<HistoryEntry>>, ApiError> {
    let query = HistoricalDataParams::from_pairs(pairs.into_inner()).validate()?;
    let history = fetch::fetch_history(
        state.provider.as_ref(),
        state.sleeper.as_ref(),
        &state.retry,
        &query,
    )
    .await?;
    Ok(web::Json(history))
}

#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
    })
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "not found".to_string(),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .service(healthcheck)
    .service(get_historical_data);
}
