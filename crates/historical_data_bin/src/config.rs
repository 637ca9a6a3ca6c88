use dotenvy::dotenv;
use std::env;
use yahoo_api::api::YAHOO_BASE_API_URL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

pub struct Config {
    pub workers: Option<usize>,
    pub host: String,
    pub port: u16,
    pub yahoo_url: String,
}

impl Config {
    pub fn new() -> Result<Config, Box<dyn std::error::Error>> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, Box<dyn std::error::Error>> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let workers = match var("HISTORICAL_DATA_WORKERS") {
            Some(workers) => Some(workers.trim().parse::<usize>()?.max(1)),
            None => None,
        };
        let port = match var("HISTORICAL_DATA_PORT") {
            Some(port) => port.trim().parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        let host = var("HISTORICAL_DATA_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let yahoo_url =
            var("HISTORICAL_DATA_YAHOO_URL").unwrap_or_else(|| YAHOO_BASE_API_URL.to_string());

        let config = Config {
            workers,
            host,
            port,
            yahoo_url,
        };
        Ok(config)
    }
}
