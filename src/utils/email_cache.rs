use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;
use tracing::info;

/// Emails known to be registered. Only positive entries are stored.
pub static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn mark_taken(email: &str) {
    EMAIL_CACHE.insert(normalize(email), true).await;
}

pub async fn is_taken(email: &str) -> bool {
    EMAIL_CACHE.get(&normalize(email)).await.unwrap_or(false)
}

async fn batch_mark(emails: &[String]) {
    futures::future::join_all(emails.iter().map(|e| mark_taken(e))).await;
}

/// Loads emails of recently active users into the cache, in batches.
pub async fn warmup_email_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut batches = sqlx::query_scalar::<_, String>(
        r#"
        SELECT email
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool)
    .chunks(batch_size.max(1));

    let mut total_count = 0usize;
    while let Some(batch) = batches.next().await {
        let emails = batch.into_iter().collect::<Result<Vec<_>, _>>()?;
        total_count += emails.len();
        batch_mark(&emails).await;
    }

    info!(total_count, days, "Email cache warmup complete");

    Ok(())
}
