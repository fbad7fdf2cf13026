//! Storage seams used by the services. `MySqlStore` implements them for
//! production; tests use mocks or the in-memory store below.

pub mod mysql;

use crate::error::AppError;
use crate::model::attendance::{Attendance, OpenAttendance};
use crate::model::employee::LeaveBalances;
use crate::model::leave_request::{LeaveCharge, LeaveRequest, LeaveStatus, NewLeaveRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub use mysql::MySqlStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn balances(&self, employee_id: u64) -> Result<Option<LeaveBalances>, AppError>;

    async fn leave_request(&self, leave_id: u64) -> Result<Option<LeaveRequest>, AppError>;

    /// Deducts `charge` and inserts the pending request in one transaction.
    /// Returns the new request id.
    async fn reserve(
        &self,
        employee_id: u64,
        request: &NewLeaveRequest,
        charge: LeaveCharge,
    ) -> Result<u64, AppError>;

    /// Moves a pending request to `status`, crediting `restore` back in the same
    /// transaction. Returns `false` when the request was no longer pending.
    async fn settle(
        &self,
        leave_id: u64,
        employee_id: u64,
        status: LeaveStatus,
        restore: Option<LeaveCharge>,
    ) -> Result<bool, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn attendance_on(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError>;

    /// Returns `false` when a record for that day already exists.
    async fn insert_check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
        location: &str,
    ) -> Result<bool, AppError>;

    /// Returns `false` unless a checked-in, not checked-out record was updated.
    async fn set_check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Rows for `date` with a check-in and no check-out.
    async fn open_attendance(&self, date: NaiveDate) -> Result<Vec<OpenAttendance>, AppError>;

    /// Closes the rows `open_attendance` would list; returns the affected count.
    async fn close_open_attendance(
        &self,
        date: NaiveDate,
        check_out: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    /// Attendance table kept in a `Vec`, with the same filters as the SQL.
    #[derive(Default)]
    pub struct MemoryAttendance {
        pub rows: Mutex<Vec<Attendance>>,
    }

    impl MemoryAttendance {
        pub fn with_rows(rows: Vec<Attendance>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn is_open(row: &Attendance, date: NaiveDate) -> bool {
            row.date == date && row.check_in.is_some() && row.check_out.is_none()
        }
    }

    #[async_trait]
    impl AttendanceStore for MemoryAttendance {
        async fn attendance_on(
            &self,
            employee_id: u64,
            date: NaiveDate,
        ) -> Result<Option<Attendance>, AppError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|r| r.employee_id == employee_id && r.date == date)
                .cloned())
        }

        async fn insert_check_in(
            &self,
            employee_id: u64,
            date: NaiveDate,
            at: DateTime<Utc>,
            location: &str,
        ) -> Result<bool, AppError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.employee_id == employee_id && r.date == date) {
                return Ok(false);
            }
            let id = rows.len() as u64 + 1;
            rows.push(Attendance {
                id,
                employee_id,
                date,
                check_in: Some(at),
                check_out: None,
                location: Some(location.to_string()),
            });
            Ok(true)
        }

        async fn set_check_out(
            &self,
            employee_id: u64,
            date: NaiveDate,
            at: DateTime<Utc>,
        ) -> Result<bool, AppError> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|r| r.employee_id == employee_id && Self::is_open(r, date))
            {
                Some(row) => {
                    row.check_out = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn open_attendance(&self, date: NaiveDate) -> Result<Vec<OpenAttendance>, AppError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| Self::is_open(r, date))
                .filter_map(|r| {
                    r.check_in.map(|check_in| OpenAttendance {
                        id: r.id,
                        employee_id: r.employee_id,
                        name: format!("Employee {}", r.employee_id),
                        check_in,
                    })
                })
                .collect())
        }

        async fn close_open_attendance(
            &self,
            date: NaiveDate,
            check_out: DateTime<Utc>,
        ) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let mut affected = 0;
            for row in rows.iter_mut().filter(|r| Self::is_open(r, date)) {
                row.check_out = Some(check_out);
                affected += 1;
            }
            Ok(affected)
        }
    }
}
