use crate::api::local_today;
use crate::auth::auth::AuthUser;
use crate::calendar::HolidayCalendar;
use crate::error::AppError;
use crate::model::attendance::Attendance;
use crate::model::employee::EmployeeProfile;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::report::daily::{DailyStatusRow, daily_report};
use crate::report::monthly::{MonthRange, MonthlySummary, monthly_report};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct DateQuery {
    /// `YYYY-MM-DD`, defaults to today
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyReportResponse {
    #[schema(example = "2026-01")]
    pub month: String,
    pub data: Vec<MonthlySummary>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyReportResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub non_working: bool,
    pub data: Vec<DailyStatusRow>,
}

/// Rows needed to classify every employee over `[from, to]`.
struct ReportInputs {
    profiles: Vec<EmployeeProfile>,
    attendance: Vec<Attendance>,
    leaves: Vec<LeaveRequest>,
}

async fn load_inputs(pool: &MySqlPool, from: NaiveDate, to: NaiveDate) -> Result<ReportInputs, AppError> {
    let profiles = sqlx::query_as::<_, EmployeeProfile>(
        r#"
        SELECT id, name, role, created_at, sick_leave_balance, casual_leave_balance
        FROM profiles
        WHERE role = ?
        ORDER BY name
        "#,
    )
    .bind(Role::Employee.as_ref())
    .fetch_all(pool)
    .await?;

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, location
        FROM attendance
        WHERE date BETWEEN ? AND ?
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    // Overlapping the range; only statuses that affect classification
    let leaves = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, from_date, to_date, reason, leave_type,
               is_half_day, half_day_period, status, created_at
        FROM leave_requests
        WHERE from_date <= ? AND to_date >= ?
        AND status IN (?, ?)
        "#,
    )
    .bind(to)
    .bind(from)
    .bind(LeaveStatus::Approved.as_ref())
    .bind(LeaveStatus::Pending.as_ref())
    .fetch_all(pool)
    .await?;

    debug!(
        %from,
        %to,
        profiles = profiles.len(),
        attendance = attendance.len(),
        leaves = leaves.len(),
        "Report inputs loaded"
    );

    Ok(ReportInputs {
        profiles,
        attendance,
        leaves,
    })
}

/// Monthly attendance summary per employee (admin)
#[utoipa::path(
    get,
    path = "/api/admin/reports/monthly",
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly summary", body = MonthlyReportResponse),
        (status = 400, description = "Malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn monthly(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    calendar: web::Data<HolidayCalendar>,
    query: web::Query<MonthQuery>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let today = local_today();
    let month = match query.month.as_deref() {
        Some(raw) => MonthRange::parse(raw)?,
        None => MonthRange::containing(today),
    };

    let inputs = load_inputs(pool.get_ref(), month.start, month.end).await?;
    let data = monthly_report(
        &month,
        today,
        &calendar,
        &inputs.profiles,
        &inputs.attendance,
        &inputs.leaves,
    );

    Ok(HttpResponse::Ok().json(MonthlyReportResponse {
        month: month.label(),
        data,
    }))
}

/// Status of every employee on one date (admin)
#[utoipa::path(
    get,
    path = "/api/admin/reports/daily",
    params(DateQuery),
    responses(
        (status = 200, description = "Daily status", body = DailyReportResponse),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn daily(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    calendar: web::Data<HolidayCalendar>,
    query: web::Query<DateQuery>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let today = local_today();
    let date = query.date.unwrap_or(today);

    let inputs = load_inputs(pool.get_ref(), date, date).await?;
    let data = daily_report(
        date,
        today,
        &calendar,
        &inputs.profiles,
        &inputs.attendance,
        &inputs.leaves,
    );

    Ok(HttpResponse::Ok().json(DailyReportResponse {
        date,
        non_working: calendar.is_non_working(date),
        data,
    }))
}
