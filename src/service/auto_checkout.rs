//! End-of-day sweep closing attendance rows that were never checked out.

use crate::error::AppError;
use crate::model::attendance::OpenAttendance;
use crate::store::AttendanceStore;
use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepPreview {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub checkout_at: DateTime<Utc>,
    pub open: Vec<OpenAttendance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SweepResult {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub checkout_at: DateTime<Utc>,
    pub count: u64,
}

/// `date` at wall-clock `time` in `tz`, as UTC. Ambiguous times take the
/// earlier instant; a time skipped by a DST jump falls back to reading it as UTC.
pub fn checkout_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = date.and_time(time);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&local),
    }
}

pub async fn preview<S>(
    store: &S,
    date: NaiveDate,
    checkout_at: DateTime<Utc>,
) -> Result<SweepPreview, AppError>
where
    S: AttendanceStore + ?Sized,
{
    let open = store.open_attendance(date).await?;
    Ok(SweepPreview {
        date,
        checkout_at,
        open,
    })
}

/// Safe to repeat: rows closed by an earlier run no longer match.
pub async fn execute<S>(
    store: &S,
    date: NaiveDate,
    checkout_at: DateTime<Utc>,
) -> Result<SweepResult, AppError>
where
    S: AttendanceStore + ?Sized,
{
    let count = store.close_open_attendance(date, checkout_at).await?;
    info!(%date, %checkout_at, count, "Auto checkout completed");

    Ok(SweepResult {
        date,
        checkout_at,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Attendance;
    use crate::store::memory::MemoryAttendance;
    use chrono::FixedOffset;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
    }

    fn row(id: u64, employee_id: u64, checked_out: bool) -> Attendance {
        let check_in = Utc.with_ymd_and_hms(2026, 1, 12, 3, 0, 0).unwrap();
        Attendance {
            id,
            employee_id,
            date: day(),
            check_in: Some(check_in),
            check_out: checked_out.then(|| check_in + chrono::Duration::hours(8)),
            location: Some("HQ".into()),
        }
    }

    #[test]
    fn checkout_time_is_converted_from_local() {
        let colombo = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let six_pm = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let at = checkout_instant(&colombo, day(), six_pm);
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 1, 12, 12, 30, 0).unwrap());
    }

    #[actix_web::test]
    async fn preview_lists_only_open_rows() {
        let mut not_checked_in = row(3, 12, false);
        not_checked_in.check_in = None;
        let store = MemoryAttendance::with_rows(vec![row(1, 10, false), row(2, 11, true), not_checked_in]);

        let at = Utc.with_ymd_and_hms(2026, 1, 12, 12, 30, 0).unwrap();
        let preview = preview(&store, day(), at).await.unwrap();
        assert_eq!(preview.open.len(), 1);
        assert_eq!(preview.open[0].employee_id, 10);
    }

    #[actix_web::test]
    async fn second_run_affects_nothing() {
        let store = MemoryAttendance::with_rows(vec![
            row(1, 10, false),
            row(2, 11, false),
            row(3, 12, true),
        ]);
        let at = Utc.with_ymd_and_hms(2026, 1, 12, 12, 30, 0).unwrap();

        let first = execute(&store, day(), at).await.unwrap();
        assert_eq!(first.count, 2);

        let second = execute(&store, day(), at).await.unwrap();
        assert_eq!(second.count, 0);

        let rows = store.rows.lock().unwrap();
        assert!(rows.iter().all(|r| r.check_out.is_some()));
        // rows closed before the sweep keep their own check-out
        assert_ne!(rows[2].check_out, Some(at));
    }

    #[actix_web::test]
    async fn other_dates_are_untouched() {
        let mut yesterday = row(1, 10, false);
        yesterday.date = day().pred_opt().unwrap();
        let store = MemoryAttendance::with_rows(vec![yesterday]);

        let at = Utc.with_ymd_and_hms(2026, 1, 12, 12, 30, 0).unwrap();
        assert_eq!(execute(&store, day(), at).await.unwrap().count, 0);
    }
}
