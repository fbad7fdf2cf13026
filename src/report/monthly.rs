use crate::calendar::HolidayCalendar;
use crate::error::AppError;
use crate::model::attendance::{Attendance, format_hm};
use crate::model::employee::EmployeeProfile;
use crate::model::leave_request::LeaveRequest;
use crate::report::classify::{DayStatus, classify_day};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// A calendar month, e.g. `2026-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    pub fn parse(month: &str) -> Result<Self, AppError> {
        let invalid = || AppError::validation(format!("Invalid month '{month}', expected YYYY-MM"));

        let (year, mon) = month.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let mon: u32 = mon.parse().map_err(|_| invalid())?;
        let start = NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)?;
        Ok(Self::starting(start))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::starting(date.with_day(1).unwrap_or(date))
    }

    fn starting(start: NaiveDate) -> Self {
        let next = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next.and_then(|n| n.pred_opt()).unwrap_or(start);
        Self { start, end }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub id: u64,
    pub name: String,
    pub present_days: u32,
    pub approved_leave_days: u32,
    pub pending_leave_days: u32,
    pub absent_days: u32,
    pub worked_minutes: i64,
    #[schema(example = "152h 30m")]
    pub worked: String,
    pub sick_leave_balance: f64,
    pub casual_leave_balance: f64,
}

/// Per-employee counts for `month`, from each employee's enrollment date onward.
pub fn monthly_report(
    month: &MonthRange,
    today: NaiveDate,
    calendar: &HolidayCalendar,
    profiles: &[EmployeeProfile],
    attendance: &[Attendance],
    leaves: &[LeaveRequest],
) -> Vec<MonthlySummary> {
    let by_day: HashMap<(u64, NaiveDate), &Attendance> = attendance
        .iter()
        .map(|a| ((a.employee_id, a.date), a))
        .collect();

    let mut leaves_by_employee: HashMap<u64, Vec<&LeaveRequest>> = HashMap::new();
    for leave in leaves {
        leaves_by_employee.entry(leave.employee_id).or_default().push(leave);
    }

    profiles
        .iter()
        .filter(|p| p.enrolled_on() <= month.end)
        .map(|p| {
            let enrolled_on = p.enrolled_on();
            let own_leaves = leaves_by_employee.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
            let balances = p.balances();

            let mut summary = MonthlySummary {
                id: p.id,
                name: p.name.clone(),
                present_days: 0,
                approved_leave_days: 0,
                pending_leave_days: 0,
                absent_days: 0,
                worked_minutes: 0,
                worked: String::new(),
                sick_leave_balance: balances.sick,
                casual_leave_balance: balances.casual,
            };

            for day in month.days().filter(|d| *d >= enrolled_on) {
                let record = by_day.get(&(p.id, day)).copied();
                match classify_day(day, today, calendar, own_leaves, record) {
                    Some(DayStatus::ApprovedLeave) => summary.approved_leave_days += 1,
                    Some(DayStatus::PendingLeave) => summary.pending_leave_days += 1,
                    Some(DayStatus::Present | DayStatus::CheckedIn) => {
                        summary.present_days += 1;
                        summary.worked_minutes += record.map(Attendance::worked_minutes).unwrap_or(0);
                    }
                    Some(DayStatus::Absent) => summary.absent_days += 1,
                    Some(DayStatus::NonWorking) | None => {}
                }
            }

            summary.worked = format_hm(summary.worked_minutes);
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidayEntry;
    use crate::model::leave_request::{LeaveStatus, LeaveType};
    use crate::model::role::Role;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    fn mercantile() -> HolidayCalendar {
        HolidayCalendar::from_entries(
            &[HolidayEntry {
                summary: "Tamil Thai Pongal Day".into(),
                categories: vec!["Public".into(), "Mercantile".into()],
                start: d(1, 15),
                end: d(1, 16),
            }],
            "Mercantile",
        )
    }

    fn profile(id: u64, enrolled: NaiveDate) -> EmployeeProfile {
        EmployeeProfile {
            id,
            name: format!("Employee {id}"),
            role: Role::Employee,
            created_at: Utc.from_utc_datetime(&enrolled.and_hms_opt(4, 0, 0).unwrap()),
            sick_leave_balance: 7.0,
            casual_leave_balance: 12.5,
        }
    }

    fn check_in_at(day: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&day.and_hms_opt(3, 30, 0).unwrap())
    }

    fn worked(employee_id: u64, day: NaiveDate, minutes: i64) -> Attendance {
        let check_in = check_in_at(day);
        Attendance {
            id: 0,
            employee_id,
            date: day,
            check_in: Some(check_in),
            check_out: Some(check_in + Duration::minutes(minutes)),
            location: Some("HQ".into()),
        }
    }

    fn leave(employee_id: u64, from: NaiveDate, to: NaiveDate, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: 0,
            employee_id,
            from_date: from,
            to_date: to,
            reason: "r".into(),
            leave_type: LeaveType::Casual,
            is_half_day: false,
            half_day_period: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn parses_month_bounds() {
        let jan = MonthRange::parse("2026-01").unwrap();
        assert_eq!(jan.start, d(1, 1));
        assert_eq!(jan.end, d(1, 31));
        assert_eq!(jan.days().count(), 31);

        let feb = MonthRange::parse("2026-02").unwrap();
        assert_eq!(feb.end, d(2, 28));

        let dec = MonthRange::parse("2025-12").unwrap();
        assert_eq!(dec.end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(dec.label(), "2025-12");

        assert_eq!(MonthRange::containing(d(2, 17)), feb);
    }

    #[test]
    fn rejects_malformed_months() {
        assert!(MonthRange::parse("2026").is_err());
        assert!(MonthRange::parse("2026-13").is_err());
        assert!(MonthRange::parse("jan-2026").is_err());
    }

    #[test]
    fn counts_start_at_enrollment_and_skip_non_working_days() {
        // Enrolled Saturday 2026-01-10; report run after the month closed.
        let month = MonthRange::parse("2026-01").unwrap();
        let report = monthly_report(
            &month,
            d(2, 15),
            &mercantile(),
            &[profile(1, d(1, 10))],
            &[],
            &[],
        );

        // Working days 12-16, 19-23, 26-30 minus the 15th holiday.
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].absent_days, 14);
        assert_eq!(report[0].present_days, 0);
        assert_eq!(report[0].worked, "0h 0m");
    }

    #[test]
    fn attendance_before_enrollment_is_not_counted() {
        let month = MonthRange::parse("2026-01").unwrap();
        let report = monthly_report(
            &month,
            d(2, 15),
            &mercantile(),
            &[profile(1, d(1, 10))],
            &[worked(1, d(1, 5), 480), worked(1, d(1, 12), 480)],
            &[],
        );
        assert_eq!(report[0].present_days, 1);
        assert_eq!(report[0].worked_minutes, 480);
        assert_eq!(report[0].absent_days, 13);
    }

    #[test]
    fn employees_enrolled_after_month_end_are_excluded() {
        let month = MonthRange::parse("2026-01").unwrap();
        let report = monthly_report(
            &month,
            d(2, 15),
            &mercantile(),
            &[profile(1, d(1, 31)), profile(2, d(2, 1))],
            &[],
            &[],
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, 1);
        // the 31st is a Saturday
        assert_eq!(report[0].absent_days, 0);
    }

    #[test]
    fn leave_takes_precedence_and_future_days_are_skipped() {
        let month = MonthRange::parse("2026-01").unwrap();
        let leaves = [
            leave(1, d(1, 5), d(1, 6), LeaveStatus::Approved),
            leave(1, d(1, 7), d(1, 7), LeaveStatus::Pending),
            // future pending leave still counts
            leave(1, d(1, 26), d(1, 27), LeaveStatus::Pending),
            leave(1, d(1, 8), d(1, 8), LeaveStatus::Rejected),
        ];
        let attendance = [
            worked(1, d(1, 5), 300), // overridden by approved leave
            worked(1, d(1, 9), 125),
            worked(1, d(1, 21), 480), // future, ignored
        ];
        let today = d(1, 20);
        let report = monthly_report(
            &month,
            today,
            &mercantile(),
            &[profile(1, d(1, 1))],
            &attendance,
            &leaves,
        );

        let row = &report[0];
        assert_eq!(row.approved_leave_days, 2);
        assert_eq!(row.pending_leave_days, 3);
        assert_eq!(row.present_days, 1);
        assert_eq!(row.worked_minutes, 125);
        assert_eq!(row.worked, "2h 5m");
        // Working days up to the 20th: 1,2,5-9,12-14,16,19,20 = 13; minus 3 leave, 1 present.
        assert_eq!(row.absent_days, 9);
        assert_eq!(row.sick_leave_balance, 7.0);
        assert_eq!(row.casual_leave_balance, 12.5);
    }

    #[test]
    fn checked_in_only_counts_present_without_minutes() {
        let month = MonthRange::parse("2026-01").unwrap();
        let mut open = worked(1, d(1, 12), 0);
        open.check_out = None;
        let report = monthly_report(
            &month,
            d(1, 12),
            &mercantile(),
            &[profile(1, d(1, 12))],
            &[open],
            &[],
        );
        assert_eq!(report[0].present_days, 1);
        assert_eq!(report[0].worked_minutes, 0);
        assert_eq!(report[0].absent_days, 0);
    }

    #[test]
    fn every_counted_day_lands_in_exactly_one_bucket() {
        let month = MonthRange::parse("2026-01").unwrap();
        let today = d(1, 31);
        let calendar = mercantile();
        let report = monthly_report(
            &month,
            today,
            &calendar,
            &[profile(1, d(1, 1))],
            &[worked(1, d(1, 2), 60), worked(1, d(1, 13), 60)],
            &[leave(1, d(1, 20), d(1, 22), LeaveStatus::Approved)],
        );
        let row = &report[0];
        let working = month.days().filter(|day| !calendar.is_non_working(*day)).count() as u32;
        assert_eq!(
            row.present_days + row.approved_leave_days + row.pending_leave_days + row.absent_days,
            working
        );
    }
}
