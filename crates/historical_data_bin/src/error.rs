use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use history_model::{InvalidParameter, ProviderError};
use serde::Serialize;
use thiserror::Error;

pub const MISSING_TICKER: &str = "Missing 'ticker' parameter.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("No data found for the given parameters.")]
    NotFound,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<InvalidParameter> for ApiError {
    fn from(err: InvalidParameter) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
