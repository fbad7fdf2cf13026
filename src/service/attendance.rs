use crate::error::AppError;
use crate::model::attendance::{Attendance, format_hm, minutes_between};
use crate::store::AttendanceStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use strum_macros::Display;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceState {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayAttendance {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub state: AttendanceState,
    pub record: Option<Attendance>,
    pub worked_minutes: Option<i64>,
    #[schema(example = "8h 15m")]
    pub worked: Option<String>,
}

fn state_of(record: Option<&Attendance>) -> AttendanceState {
    match record {
        Some(r) if r.check_in.is_some() && r.check_out.is_some() => AttendanceState::CheckedOut,
        Some(r) if r.check_in.is_some() => AttendanceState::CheckedIn,
        _ => AttendanceState::NotCheckedIn,
    }
}

/// Opens the day's record. One record per employee per local date.
pub async fn check_in<S>(
    store: &S,
    employee_id: u64,
    date: NaiveDate,
    now: DateTime<Utc>,
    location: &str,
) -> Result<(), AppError>
where
    S: AttendanceStore + ?Sized,
{
    let location = location.trim();
    if location.is_empty() {
        return Err(AppError::validation("Please enter your location."));
    }

    if !store.insert_check_in(employee_id, date, now, location).await? {
        return Err(AppError::conflict("You already checked in today."));
    }

    info!(employee_id, %date, location, "Checked in");
    Ok(())
}

pub async fn check_out<S>(
    store: &S,
    employee_id: u64,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<i64, AppError>
where
    S: AttendanceStore + ?Sized,
{
    let record = store.attendance_on(employee_id, date).await?;
    match state_of(record.as_ref()) {
        AttendanceState::NotCheckedIn => {
            return Err(AppError::validation("Please check in first."));
        }
        AttendanceState::CheckedOut => {
            return Err(AppError::conflict("You already checked out today."));
        }
        AttendanceState::CheckedIn => {}
    }

    // The update re-checks the open predicate, so a concurrent check-out loses here.
    if !store.set_check_out(employee_id, date, now).await? {
        return Err(AppError::conflict("You already checked out today."));
    }

    let worked = record
        .and_then(|r| r.check_in)
        .map(|check_in| minutes_between(check_in, now))
        .unwrap_or(0);

    info!(employee_id, %date, worked_minutes = worked, "Checked out");
    Ok(worked)
}

pub async fn today<S>(
    store: &S,
    employee_id: u64,
    date: NaiveDate,
) -> Result<TodayAttendance, AppError>
where
    S: AttendanceStore + ?Sized,
{
    let record = store.attendance_on(employee_id, date).await?;
    let state = state_of(record.as_ref());
    let worked_minutes = match state {
        AttendanceState::CheckedOut => record.as_ref().map(Attendance::worked_minutes),
        _ => None,
    };

    Ok(TodayAttendance {
        date,
        state,
        record,
        worked_minutes,
        worked: worked_minutes.map(format_hm),
    })
}
