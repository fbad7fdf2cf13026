use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::models::TokenType;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Decodes an access token. Refresh tokens are not accepted here.
pub fn authenticate(token: &str, secret: &str) -> Result<AuthUser, String> {
    let claims = verify_token(token, secret)?;
    if claims.token_type != TokenType::Access {
        return Err("Access token required".to_string());
    }

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        ready(authenticate(token, &config.jwt_secret).map_err(|_| ErrorUnauthorized("Invalid token")))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin only"))
        }
    }

    /// Self-service pages are for employees; admins manage them from the admin side.
    pub fn require_employee(&self) -> Result<u64, AppError> {
        if self.role == Role::Employee {
            Ok(self.user_id)
        } else {
            Err(AppError::forbidden("Employees only"))
        }
    }
}

/// Who triggered an auto-checkout sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepCaller {
    Scheduler,
    Admin(u64),
}

/// Compares secrets without short-circuiting on the first differing byte.
fn secret_matches(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Accepts the configured cron secret or an admin access token. Without a
/// configured secret only admin tokens pass.
pub fn authorize_sweep(
    bearer: Option<&str>,
    cron_secret: Option<&str>,
    jwt_secret: &str,
) -> Result<SweepCaller, AppError> {
    let token = bearer.ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    if let Some(secret) = cron_secret {
        if secret_matches(token, secret) {
            return Ok(SweepCaller::Scheduler);
        }
    }

    let user = authenticate(token, jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;
    user.require_admin()?;
    Ok(SweepCaller::Admin(user.user_id))
}
