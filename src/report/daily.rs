use crate::calendar::HolidayCalendar;
use crate::model::attendance::Attendance;
use crate::model::employee::EmployeeProfile;
use crate::model::leave_request::LeaveRequest;
use crate::report::classify::{DayStatus, classify_day};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyStatusRow {
    pub id: u64,
    pub name: String,
    /// `null` for a working day that has not arrived yet
    pub status: Option<DayStatus>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// Status of every employee enrolled on or before `date`.
pub fn daily_report(
    date: NaiveDate,
    today: NaiveDate,
    calendar: &HolidayCalendar,
    profiles: &[EmployeeProfile],
    attendance: &[Attendance],
    leaves: &[LeaveRequest],
) -> Vec<DailyStatusRow> {
    let by_employee: HashMap<u64, &Attendance> = attendance
        .iter()
        .filter(|a| a.date == date)
        .map(|a| (a.employee_id, a))
        .collect();

    profiles
        .iter()
        .filter(|p| p.enrolled_on() <= date)
        .map(|p| {
            let own_leaves: Vec<&LeaveRequest> =
                leaves.iter().filter(|l| l.employee_id == p.id).collect();
            let record = by_employee.get(&p.id).copied();
            let status = classify_day(date, today, calendar, &own_leaves, record);

            let mut row = DailyStatusRow {
                id: p.id,
                name: p.name.clone(),
                status,
                check_in: None,
                check_out: None,
                location: None,
            };
            if let (Some(DayStatus::Present | DayStatus::CheckedIn), Some(a)) = (status, record) {
                row.check_in = a.check_in;
                row.check_out = a.check_out;
                row.location = a.location.clone();
            }
            row
        })
        .collect()
}
