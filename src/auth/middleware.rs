use crate::auth::auth::{AuthUser, authenticate, bearer_token};
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::{Value, json};

/// Resolves the caller from the bearer token, or the 401 body to answer with.
fn resolve(req: &ServiceRequest, secret: &str) -> Result<AuthUser, Value> {
    if !req.headers().contains_key("Authorization") {
        return Err(json!({"error": "Missing Authorization header"}));
    }
    let token = bearer_token(req.request())
        .ok_or_else(|| json!({"error": "Authorization header must be a Bearer token"}))?;

    authenticate(token, secret)
        .map_err(|e| json!({"error": "Invalid or expired token", "details": e}))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    match resolve(&req, &config.jwt_secret) {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(body) => {
            let resp = HttpResponse::Unauthorized().json(body);
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
