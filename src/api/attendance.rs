use crate::api::local_today;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::employee::LeaveBalances;
use crate::service::attendance::{self, TodayAttendance};
use crate::store::{LeaveStore, MySqlStore};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = "Colombo head office")]
    pub location: String,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[serde(flatten)]
    pub attendance: TodayAttendance,
    pub balances: Option<LeaveBalances>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Location missing", body = Object, example = json!({
            "error": "Please enter your location."
        })),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "You already checked in today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<CheckInRequest>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    attendance::check_in(
        store.get_ref(),
        employee_id,
        local_today(),
        Utc::now(),
        &payload.location,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully"
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "worked_minutes": 495
        })),
        (status = 400, description = "No check-in today", body = Object, example = json!({
            "error": "Please check in first."
        })),
        (status = 409, description = "Already checked out today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    let worked_minutes =
        attendance::check_out(store.get_ref(), employee_id, local_today(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "worked_minutes": worked_minutes
    })))
}

/// Today's attendance state and current leave balances
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    let attendance = attendance::today(store.get_ref(), employee_id, local_today()).await?;
    let balances = store.balances(employee_id).await?;

    Ok(HttpResponse::Ok().json(TodayResponse {
        attendance,
        balances,
    }))
}
