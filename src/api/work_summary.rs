use crate::api::local_today;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::work_summary::{DEFAULT_WORK_TYPES, WorkSummaryEntry};
use crate::report::monthly::MonthRange;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const WORK_MAX_LEN: usize = 255;

#[derive(Deserialize, ToSchema)]
pub struct NewWorkItem {
    #[schema(example = "Printer setup")]
    pub work: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateHandledTasks {
    #[schema(example = 4)]
    pub handled_tasks: u32,
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryMonthQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct WorkSummaryResponse {
    #[schema(example = "2026-01")]
    pub month: String,
    pub data: Vec<WorkSummaryEntry>,
    #[schema(example = 27)]
    pub total_handled_tasks: u64,
}

impl WorkSummaryResponse {
    fn new(month: String, data: Vec<WorkSummaryEntry>) -> Self {
        let total_handled_tasks = data.iter().map(|e| u64::from(e.handled_tasks)).sum();
        Self {
            month,
            data,
            total_handled_tasks,
        }
    }
}

fn validate_work(work: &str) -> Result<&str, AppError> {
    let work = work.trim();
    if work.is_empty() {
        return Err(AppError::validation("Please enter the work description."));
    }
    if work.chars().count() > WORK_MAX_LEN {
        return Err(AppError::validation(format!(
            "Work description must be at most {WORK_MAX_LEN} characters"
        )));
    }
    Ok(work)
}

async fn entries(
    pool: &MySqlPool,
    employee_id: u64,
    month: &str,
) -> Result<Vec<WorkSummaryEntry>, AppError> {
    let rows = sqlx::query_as::<_, WorkSummaryEntry>(
        r#"
        SELECT id, employee_id, month, work, handled_tasks, updated_at
        FROM work_summary
        WHERE employee_id = ? AND month = ?
        ORDER BY id
        "#,
    )
    .bind(employee_id)
    .bind(month)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts the default work types the first time a month is opened.
async fn seed_month(pool: &MySqlPool, employee_id: u64, month: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    // Serializes concurrent first opens for the same employee
    sqlx::query("SELECT id FROM profiles WHERE id = ? FOR UPDATE")
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM work_summary WHERE employee_id = ? AND month = ?",
    )
    .bind(employee_id)
    .bind(month)
    .fetch_one(&mut *tx)
    .await?;

    if existing == 0 {
        for work in DEFAULT_WORK_TYPES {
            sqlx::query(
                "INSERT INTO work_summary (employee_id, month, work, handled_tasks) VALUES (?, ?, ?, 0)",
            )
            .bind(employee_id)
            .bind(month)
            .bind(*work)
            .execute(&mut *tx)
            .await?;
        }
        info!(employee_id, month, "Work summary seeded");
    }

    tx.commit().await?;
    Ok(())
}

/// The caller's work summary for the current month
#[utoipa::path(
    get,
    path = "/api/work-summary",
    responses(
        (status = 200, description = "Current month's work summary", body = WorkSummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only")
    ),
    security(("bearer_auth" = [])),
    tag = "Work Summary"
)]
pub async fn my_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;
    let month = MonthRange::containing(local_today()).label();

    seed_month(pool.get_ref(), employee_id, &month).await?;
    let data = entries(pool.get_ref(), employee_id, &month).await?;

    Ok(HttpResponse::Ok().json(WorkSummaryResponse::new(month, data)))
}

/// Add a work item to the current month
#[utoipa::path(
    post,
    path = "/api/work-summary",
    request_body = NewWorkItem,
    responses(
        (status = 201, description = "Work item added", body = WorkSummaryEntry),
        (status = 400, description = "Empty work description"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only")
    ),
    security(("bearer_auth" = [])),
    tag = "Work Summary"
)]
pub async fn add_item(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewWorkItem>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;
    let work = validate_work(&payload.work)?;
    let month = MonthRange::containing(local_today()).label();

    let inserted = sqlx::query(
        "INSERT INTO work_summary (employee_id, month, work, handled_tasks) VALUES (?, ?, ?, 0)",
    )
    .bind(employee_id)
    .bind(&month)
    .bind(work)
    .execute(pool.get_ref())
    .await?;

    let entry = sqlx::query_as::<_, WorkSummaryEntry>(
        "SELECT id, employee_id, month, work, handled_tasks, updated_at FROM work_summary WHERE id = ?",
    )
    .bind(inserted.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(entry))
}

/// Set the handled task count of one of the caller's rows
#[utoipa::path(
    put,
    path = "/api/work-summary/{id}",
    params(("id" = u64, Path, description = "Work summary row ID")),
    request_body = UpdateHandledTasks,
    responses(
        (status = 200, description = "Updated", body = Object, example = json!({
            "message": "Work summary updated"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Row not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Work Summary"
)]
pub async fn update_item(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateHandledTasks>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    // Ownership is part of the predicate, so other employees' rows read as missing
    let result = sqlx::query(
        "UPDATE work_summary SET handled_tasks = ?, updated_at = NOW() WHERE id = ? AND employee_id = ?",
    )
    .bind(payload.handled_tasks)
    .bind(path.into_inner())
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Work summary row not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Work summary updated"
    })))
}

/// Delete one of the caller's rows
#[utoipa::path(
    delete,
    path = "/api/work-summary/{id}",
    params(("id" = u64, Path, description = "Work summary row ID")),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Row not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Work Summary"
)]
pub async fn delete_item(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    let result = sqlx::query("DELETE FROM work_summary WHERE id = ? AND employee_id = ?")
        .bind(path.into_inner())
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Work summary row not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// An employee's work summary for a month (admin)
#[utoipa::path(
    get,
    path = "/api/admin/work-summary/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        SummaryMonthQuery
    ),
    responses(
        (status = 200, description = "Work summary", body = WorkSummaryResponse),
        (status = 400, description = "Malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Work Summary"
)]
pub async fn employee_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<SummaryMonthQuery>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let month = match query.month.as_deref() {
        Some(raw) => MonthRange::parse(raw)?,
        None => MonthRange::containing(local_today()),
    }
    .label();

    let data = entries(pool.get_ref(), path.into_inner(), &month).await?;
    Ok(HttpResponse::Ok().json(WorkSummaryResponse::new(month, data)))
}
