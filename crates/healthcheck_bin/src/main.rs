use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_PORT: &str = "8080";

#[derive(Debug, Error)]
enum CustomError {
    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Status code != 200 or no healthcheck")]
    NotOk,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
}

fn healthcheck_url(port: Option<String>) -> String {
    let port = port
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    format!("http://localhost:{}/healthcheck", port.trim())
}

fn check(body: StatusJSON) -> Result<(), CustomError> {
    if body.status != "ok" {
        return Err(CustomError::NotOk);
    }
    Ok(())
}

fn main() -> Result<(), CustomError> {
    dotenvy::dotenv().ok();
    let url = healthcheck_url(env::var("HISTORICAL_DATA_PORT").ok());
    let res = reqwest::blocking::get(url)?;
    if res.status() != reqwest::StatusCode::OK {
        return Err(CustomError::NotOk);
    }
    check(res.json::<StatusJSON>()?)
}
