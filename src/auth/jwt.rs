use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

fn claims(user_id: u64, email: String, role: Role, token_type: TokenType, ttl: usize) -> Claims {
    Claims {
        user_id,
        sub: email,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = claims(user_id, email, role, TokenType::Access, ttl);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    user_id: u64,
    email: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = claims(user_id, email, role, TokenType::Refresh, ttl);

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
