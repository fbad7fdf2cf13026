use crate::calendar::HolidayCalendar;
use crate::model::attendance::Attendance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Exactly one of these holds for a classified (employee, date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    NonWorking,
    ApprovedLeave,
    PendingLeave,
    Present,
    CheckedIn,
    Absent,
}

fn on_leave(date: NaiveDate, leaves: &[&LeaveRequest], status: LeaveStatus) -> bool {
    leaves.iter().any(|l| l.status == status && l.covers(date))
}

/// Priority: non-working > approved leave > pending leave > (future: `None`)
/// > present / checked-in > absent.
pub fn classify_day(
    date: NaiveDate,
    today: NaiveDate,
    calendar: &HolidayCalendar,
    leaves: &[&LeaveRequest],
    attendance: Option<&Attendance>,
) -> Option<DayStatus> {
    if calendar.is_non_working(date) {
        return Some(DayStatus::NonWorking);
    }
    if on_leave(date, leaves, LeaveStatus::Approved) {
        return Some(DayStatus::ApprovedLeave);
    }
    if on_leave(date, leaves, LeaveStatus::Pending) {
        return Some(DayStatus::PendingLeave);
    }
    if date > today {
        return None;
    }

    match attendance {
        Some(a) if a.check_in.is_some() => Some(if a.check_out.is_some() {
            DayStatus::Present
        } else {
            DayStatus::CheckedIn
        }),
        _ => Some(DayStatus::Absent),
    }
}
