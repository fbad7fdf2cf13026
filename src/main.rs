use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod calendar;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod report;
mod routes;
mod service;
mod store;
mod utils;

use calendar::HolidayCalendar;
use config::Config;
use db::init_db;
use routes::Limiters;
use store::MySqlStore;

use crate::docs::api_doc;
use crate::utils::email_cache;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Hub"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("loading configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    let calendar = HolidayCalendar::load_dir(&config.holiday_calendar_dir, &config.holiday_category)
        .context("loading holiday calendar")?;
    info!(category = calendar.category(), "Non-working days: weekends and holidays");
    let calendar = Data::new(calendar);
    let store = Data::new(MySqlStore::new(pool.clone()));
    let limiters = Limiters::from_config(&config)?;

    if config.cron_secret.is_none() {
        info!("CRON_SECRET not set; auto checkout accepts admin tokens only");
    }

    let pool_for_cache_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        // Last 30 days of active users, in batches of 250
        if let Err(e) = email_cache::warmup_email_cache(&pool_for_cache_warmup, 30, 250).await {
            error!(error = %e, "Failed to warm up email cache");
        }
    });

    let openapi = api_doc(&config.api_prefix);
    let server_addr = config.server_addr.clone();
    let config = Data::new(config);
    let pool = Data::new(pool);

    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} to match JS/CSS files
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(calendar.clone())
            .app_data(store.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
