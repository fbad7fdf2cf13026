use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Work types seeded the first time an employee opens a month.
pub const DEFAULT_WORK_TYPES: &[&str] = &[
    "Computer Repair",
    "Computer Upgrade",
    "New Computer installation",
    "Head office user Support",
    "POS Configuration",
    "Mobile Device configuration",
    "Scan and Go",
    "Tabs ( HC )",
    "Tabs ( HRP )",
    "Tabs ( Backey Tab )",
    "Other users Support",
];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WorkSummaryEntry {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01")]
    pub month: String,
    #[schema(example = "POS Configuration")]
    pub work: String,
    #[schema(example = 4)]
    pub handled_tasks: u32,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
