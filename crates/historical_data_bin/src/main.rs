use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};
use std::{process::exit, sync::Arc};
use yahoo_api::api::YahooAPI;

mod config;
mod error;
mod fetch;
mod handlers;
#[cfg(test)]
mod testing;
mod utils;

use config::Config;
use handlers::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    info!("Provider: {}", config.yahoo_url);
    let yahoo_api = Arc::new(YahooAPI::with_base_url(&config.yahoo_url));
    let state = web::Data::new(AppState::new(yahoo_api));

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))?;

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Listening on {}:{}", config.host, config.port);
    server.run().await
}
