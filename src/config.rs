use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,
    pub rate_sweep_per_min: u32,

    pub api_prefix: String,

    /// Bearer secret accepted by the auto-checkout endpoint (external scheduler)
    pub cron_secret: Option<String>,
    pub auto_checkout_time: NaiveTime,

    pub holiday_calendar_dir: String,
    pub holiday_category: String,

    pub default_sick_balance: f64,
    pub default_casual_balance: f64,

    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let auto_checkout_time = match env::var("AUTO_CHECKOUT_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .with_context(|| format!("AUTO_CHECKOUT_TIME must be HH:MM, got {raw}"))?,
            Err(_) => NaiveTime::from_hms_opt(18, 0, 0).context("invalid default checkout time")?,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: or_default("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: or_default("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: or_default("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: or_default("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_sweep_per_min: or_default("RATE_SWEEP_PER_MIN", 10)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            cron_secret: env::var("CRON_SECRET").ok().filter(|s| !s.trim().is_empty()),
            auto_checkout_time,

            holiday_calendar_dir: env::var("HOLIDAY_CALENDAR_DIR")
                .unwrap_or_else(|_| "data/holidays".to_string()),
            holiday_category: env::var("HOLIDAY_CATEGORY")
                .unwrap_or_else(|_| "Mercantile".to_string()),

            default_sick_balance: or_default("DEFAULT_SICK_BALANCE", 7.0)?,
            default_casual_balance: or_default("DEFAULT_CASUAL_BALANCE", 14.0)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}
