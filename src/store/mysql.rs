use crate::error::AppError;
use crate::model::attendance::{Attendance, OpenAttendance};
use crate::model::employee::LeaveBalances;
use crate::model::leave_request::{
    LeaveCharge, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::store::{AttendanceStore, LeaveStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn balance_column(leave_type: LeaveType) -> &'static str {
    match leave_type {
        LeaveType::Sick => "sick_leave_balance",
        LeaveType::Casual => "casual_leave_balance",
    }
}

pub(crate) fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn balances(&self, employee_id: u64) -> Result<Option<LeaveBalances>, AppError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "SELECT sick_leave_balance, casual_leave_balance FROM profiles WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(sick, casual)| LeaveBalances { sick, casual }))
    }

    async fn leave_request(&self, leave_id: u64) -> Result<Option<LeaveRequest>, AppError> {
        let leave = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT id, employee_id, from_date, to_date, reason, leave_type,
                   is_half_day, half_day_period, status, created_at
            FROM leave_requests
            WHERE id = ?
            "#,
        )
        .bind(leave_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(leave)
    }

    async fn reserve(
        &self,
        employee_id: u64,
        request: &NewLeaveRequest,
        charge: LeaveCharge,
    ) -> Result<u64, AppError> {
        let column = balance_column(charge.leave_type);
        let mut tx = self.pool.begin().await?;

        // Guarded so a concurrent submission cannot overdraw the balance.
        let deducted = sqlx::query(&format!(
            "UPDATE profiles SET {column} = {column} - ? WHERE id = ? AND {column} >= ?"
        ))
        .bind(charge.days)
        .bind(employee_id)
        .bind(charge.days)
        .execute(&mut *tx)
        .await?;

        if deducted.rows_affected() == 0 {
            tx.rollback().await?;
            warn!(employee_id, leave_type = %charge.leave_type, "Balance changed during submission");
            return Err(AppError::conflict(
                "Leave balance changed while submitting; please try again",
            ));
        }

        let period = if request.is_half_day {
            request.half_day_period.map(|p| p.as_ref().to_string())
        } else {
            None
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, from_date, to_date, reason, leave_type, is_half_day, half_day_period, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(request.from_date)
        .bind(request.to_date)
        .bind(request.reason.trim())
        .bind(charge.leave_type.as_ref())
        .bind(request.is_half_day)
        .bind(period)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_id())
    }

    async fn settle(
        &self,
        leave_id: u64,
        employee_id: u64,
        status: LeaveStatus,
        restore: Option<LeaveCharge>,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE leave_requests SET status = ? WHERE id = ? AND status = ?",
        )
        .bind(status.as_ref())
        .bind(leave_id)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(charge) = restore {
            let column = balance_column(charge.leave_type);
            sqlx::query(&format!(
                "UPDATE profiles SET {column} = {column} + ? WHERE id = ?"
            ))
            .bind(charge.days)
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(leave_id, status = %status, "Leave request settled");
        Ok(true)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn attendance_on(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError> {
        let record = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, check_in, check_out, location
            FROM attendance
            WHERE employee_id = ? AND date = ?
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
        location: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, location)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(at)
        .bind(location)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            // Duplicate check-in for same day
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?
            WHERE employee_id = ?
            AND date = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(at)
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn open_attendance(&self, date: NaiveDate) -> Result<Vec<OpenAttendance>, AppError> {
        let rows = sqlx::query_as::<_, OpenAttendance>(
            r#"
            SELECT a.id, a.employee_id, p.name, a.check_in
            FROM attendance a
            JOIN profiles p ON p.id = a.employee_id
            WHERE a.date = ?
            AND a.check_in IS NOT NULL
            AND a.check_out IS NULL
            ORDER BY p.name
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn close_open_attendance(
        &self,
        date: NaiveDate,
        check_out: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?
            WHERE date = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(check_out)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
