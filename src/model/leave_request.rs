use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Casual,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HalfDayPeriod {
    Morning,
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 12,
    "from_date": "2026-01-12",
    "to_date": "2026-01-13",
    "reason": "Family event",
    "leave_type": "casual",
    "is_half_day": false,
    "half_day_period": null,
    "status": "pending",
    "created_at": "2026-01-05T08:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to_date: NaiveDate,
    pub reason: String,
    pub leave_type: LeaveType,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub status: LeaveStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

fn decode_enum<T>(row: &MySqlRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, MySqlRow> for LeaveRequest {
    fn from_row(row: &'r MySqlRow) -> sqlx::Result<Self> {
        let half_day_period = match row.try_get::<Option<String>, _>("half_day_period")? {
            Some(raw) => Some(raw.parse().map_err(|e: strum::ParseError| {
                sqlx::Error::ColumnDecode {
                    index: "half_day_period".to_string(),
                    source: Box::new(e),
                }
            })?),
            None => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            from_date: row.try_get("from_date")?,
            to_date: row.try_get("to_date")?,
            reason: row.try_get("reason")?,
            leave_type: decode_enum(row, "leave_type")?,
            is_half_day: row.try_get("is_half_day")?,
            half_day_period,
            status: decode_enum(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl LeaveRequest {
    /// Inclusive date-range check.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Submission payload, validated by the ledger before anything is written.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewLeaveRequest {
    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(example = "2026-01-13", value_type = String, format = "date")]
    pub to_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
    pub leave_type: LeaveType,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
}

/// Days moved between a balance column and a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LeaveCharge {
    pub leave_type: LeaveType,
    #[schema(example = 2.0)]
    pub days: f64,
}
