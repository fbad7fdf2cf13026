use crate::{
    auth::{auth::AuthUser, handlers::is_email_available, password::hash_password},
    config::Config,
    error::AppError,
    model::{employee::EmployeeProfile, role::Role},
    store::mysql::is_duplicate_key,
    utils::email_cache,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const MIN_PASSWORD_LEN: usize = 6;

const PROFILE_COLUMNS: &str =
    "id, name, role, created_at, sick_leave_balance, casual_leave_balance";

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Nimal Perera")]
    pub name: String,
    #[schema(example = "nimal@example.com", format = "email", value_type = String)]
    pub email: String,
    /// Temporary password handed to the employee, at least 6 characters
    #[schema(example = "welcome1")]
    pub temp_password: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedEmployee {
    #[schema(example = "Employee created")]
    pub message: String,
    pub profile: EmployeeProfile,
}

/// Trimmed name, normalized email and trimmed temporary password.
fn validate(payload: &CreateEmployee) -> Result<(String, String, String), AppError> {
    let name = payload.name.trim();
    let email = email_cache::normalize(&payload.email);
    let password = payload.temp_password.trim();

    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Temporary password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok((name.to_string(), email, password.to_string()))
}

/// Provision an employee account and profile (admin)
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = CreatedEmployee),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "error": "Email already registered"
        }))
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;
    let (name, email, password) = validate(&payload)?;

    if !is_email_available(&email, pool.get_ref()).await? {
        return Err(AppError::conflict("Email already registered"));
    }

    let hashed = hash_password(&password)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO users (email, password, role) VALUES (?, ?, ?)")
        .bind(&email)
        .bind(&hashed)
        .bind(Role::Employee.as_ref())
        .execute(&mut *tx)
        .await;

    let user_id = match inserted {
        Ok(done) => done.last_insert_id(),
        // Lost a race with another provisioning of the same email
        Err(e) if is_duplicate_key(&e) => {
            email_cache::mark_taken(&email).await;
            return Err(AppError::conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    sqlx::query(
        r#"
        INSERT INTO profiles (id, name, role, sick_leave_balance, casual_leave_balance)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&name)
    .bind(Role::Employee.as_ref())
    .bind(config.default_sick_balance)
    .bind(config.default_casual_balance)
    .execute(&mut *tx)
    .await?;

    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
    let profile = sqlx::query_as::<_, EmployeeProfile>(&sql)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    email_cache::mark_taken(&email).await;
    info!(user_id, admin_id = auth.user_id, "Employee provisioned");

    Ok(HttpResponse::Created().json(CreatedEmployee {
        message: "Employee created".to_string(),
        profile,
    }))
}

/// Employee profiles ordered by name (admin)
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Employee profiles", body = [EmployeeProfile]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let sql = format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = ? ORDER BY name"
    );
    let profiles = sqlx::query_as::<_, EmployeeProfile>(&sql)
        .bind(Role::Employee.as_ref())
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(profiles))
}

/// The caller's own profile and leave balances
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Own profile", body = EmployeeProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, AppError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
    let profile = sqlx::query_as::<_, EmployeeProfile>(&sql)
        .bind(auth.user_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    Ok(HttpResponse::Ok().json(profile))
}
