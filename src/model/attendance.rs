use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl Attendance {
    /// Whole minutes between check-in and check-out, 0 unless both exist.
    pub fn worked_minutes(&self) -> i64 {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => minutes_between(check_in, check_out),
            _ => 0,
        }
    }
}

pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes().max(0)
}

/// `125` -> `"2h 5m"`
pub fn format_hm(total_minutes: i64) -> String {
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// A still-open attendance row, as listed by the auto-checkout preview.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OpenAttendance {
    pub id: u64,
    pub employee_id: u64,
    pub name: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 12, h, m, s).unwrap()
    }

    fn record(check_in: Option<DateTime<Utc>>, check_out: Option<DateTime<Utc>>) -> Attendance {
        Attendance {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            check_in,
            check_out,
            location: Some("Office".into()),
        }
    }

    #[test]
    fn floors_to_whole_minutes() {
        assert_eq!(record(Some(at(9, 0, 0)), Some(at(17, 30, 59))).worked_minutes(), 510);
    }

    #[test]
    fn zero_when_an_endpoint_is_missing() {
        assert_eq!(record(Some(at(9, 0, 0)), None).worked_minutes(), 0);
        assert_eq!(record(None, Some(at(9, 0, 0))).worked_minutes(), 0);
        assert_eq!(record(None, None).worked_minutes(), 0);
    }

    #[test]
    fn never_negative() {
        assert_eq!(record(Some(at(18, 0, 0)), Some(at(9, 0, 0))).worked_minutes(), 0);
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_hm(0), "0h 0m");
        assert_eq!(format_hm(125), "2h 5m");
        assert_eq!(format_hm(510), "8h 30m");
    }
}
