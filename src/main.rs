use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod engine;
mod error;
mod model;
mod routes;
mod store;

use config::Config;
use db::init_db;
use store::mysql::MySqlStore;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HR engine is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, prefix = %config.api_prefix, "Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let store = MySqlStore::new(pool, Duration::from_secs(config.employee_cache_ttl_secs));
    let limiter = Arc::new(routes::build_limiter(config.rate_protected_per_min)?);

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard matches JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(store.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, limiter.clone()))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
