use crate::api::local_today;
use crate::auth::auth::{SweepCaller, authorize_sweep, bearer_token};
use crate::config::Config;
use crate::error::AppError;
use crate::service::auto_checkout::{self, SweepPreview, SweepResult, checkout_instant};
use crate::store::MySqlStore;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::info;

fn sweep_target(config: &Config) -> (NaiveDate, DateTime<Utc>) {
    let date = local_today();
    (date, checkout_instant(&Local, date, config.auto_checkout_time))
}

fn authorize(req: &HttpRequest, config: &Config) -> Result<SweepCaller, AppError> {
    authorize_sweep(
        bearer_token(req),
        config.cron_secret.as_deref(),
        &config.jwt_secret,
    )
}

/// Records that the sweep would close today
#[utoipa::path(
    get,
    path = "/auto-checkout",
    responses(
        (status = 200, description = "Open attendance rows for today", body = SweepPreview),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Auto Checkout"
)]
pub async fn preview(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<MySqlStore>,
) -> Result<impl Responder, AppError> {
    authorize(&req, &config)?;

    let (date, checkout_at) = sweep_target(&config);
    let preview = auto_checkout::preview(store.get_ref(), date, checkout_at).await?;

    Ok(HttpResponse::Ok().json(preview))
}

/// Check out everyone still checked in today at the configured time
#[utoipa::path(
    post,
    path = "/auto-checkout",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResult),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Auto Checkout"
)]
pub async fn execute(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<MySqlStore>,
) -> Result<impl Responder, AppError> {
    let caller = authorize(&req, &config)?;
    info!(?caller, "Auto checkout triggered");

    let (date, checkout_at) = sweep_target(&config);
    let result = auto_checkout::execute(store.get_ref(), date, checkout_at).await?;

    Ok(HttpResponse::Ok().json(result))
}
