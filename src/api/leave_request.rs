use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::leave_request::{LeaveCharge, LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::service::ledger::{self, ReviewDecision, SubmittedLeave};
use crate::store::{LeaveStore, MySqlStore};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const LEAVE_COLUMNS: &str = "id, employee_id, from_date, to_date, reason, leave_type, \
                             is_half_day, half_day_period, status, created_at";

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 12)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

/// Page, page size and row offset; the size is clamped to 1..=100 and the
/// offset saturates instead of overflowing on huge page numbers.
fn page_window(page: Option<u64>, per_page: Option<u64>) -> (u64, u64, u64) {
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(per_page);
    (page, per_page, offset)
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Submit a leave request; the days are reserved from the balance immediately
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = NewLeaveRequest,
    responses(
        (status = 201, description = "Leave request submitted", body = SubmittedLeave),
        (status = 400, description = "Invalid request or insufficient balance", body = Object, example = json!({
            "error": "Insufficient leave balance. You have 2 days remaining for sick leave."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 409, description = "Balance changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<NewLeaveRequest>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;
    let submitted = ledger::submit_leave(store.get_ref(), employee_id, &payload).await?;

    Ok(HttpResponse::Created().json(submitted))
}

/// The caller's own leave requests, newest first
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    responses(
        (status = 200, description = "Own leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;

    let sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY created_at DESC, id DESC"
    );
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(employee_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

#[derive(Serialize, ToSchema)]
pub struct CancelResponse {
    #[schema(example = "Leave request cancelled")]
    pub message: String,
    pub restored: LeaveCharge,
}

/// Cancel one of the caller's pending requests and restore its days
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "ID of the leave request to cancel")),
    responses(
        (status = 200, description = "Cancelled", body = CancelResponse),
        (status = 400, description = "Not pending"),
        (status = 403, description = "Not the owner, or not an employee"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee()?;
    let restored = ledger::cancel_leave(store.get_ref(), employee_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(CancelResponse {
        message: "Leave request cancelled".to_string(),
        restored,
    }))
}

async fn review(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    leave_id: u64,
    decision: ReviewDecision,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let status = ledger::review_leave(store.get_ref(), leave_id, decision).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave {status}"),
        "status": status
    })))
}

/// Approve a pending leave request (admin)
#[utoipa::path(
    put,
    path = "/api/admin/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved",
            "status": "approved"
        })),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    review(auth, store, path.into_inner(), ReviewDecision::Approve).await
}

/// Reject a pending leave request and restore its days (admin)
#[utoipa::path(
    put,
    path = "/api/admin/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected",
            "status": "rejected"
        })),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    review(auth, store, path.into_inner(), ReviewDecision::Reject).await
}

/// A single leave request (admin)
#[utoipa::path(
    get,
    path = "/api/admin/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "Leave request not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let leave = store
        .leave_request(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    Ok(HttpResponse::Ok().json(leave))
}

/// Paginated leave requests, optionally filtered (admin)
#[utoipa::path(
    get,
    path = "/api/admin/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let (page, per_page, offset) = page_window(query.page, query.per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = &query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.as_ref()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        {where_sql}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}
