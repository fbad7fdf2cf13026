use crate::model::leave_request::LeaveType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Validation(#[error(not(source))] String),

    #[display(
        fmt = "Insufficient leave balance. You have {} days remaining for {} leave.",
        available,
        leave_type
    )]
    InsufficientBalance { available: f64, leave_type: LeaveType },

    #[display(fmt = "{}", _0)]
    Unauthorized(#[error(not(source))] String),

    #[display(fmt = "{}", _0)]
    Forbidden(#[error(not(source))] String),

    #[display(fmt = "{}", _0)]
    NotFound(#[error(not(source))] String),

    #[display(fmt = "{}", _0)]
    Conflict(#[error(not(source))] String),

    #[display(fmt = "Database error")]
    Database(sqlx::Error),

    #[display(fmt = "Internal Server Error")]
    Internal(#[error(not(source))] String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "error": self.to_string(), "details": e.to_string() })
            }
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("hash failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_balance_message_names_type_and_remaining_days() {
        let err = AppError::InsufficientBalance {
            available: 1.5,
            leave_type: LeaveType::Sick,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient leave balance. You have 1.5 days remaining for sick leave."
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
