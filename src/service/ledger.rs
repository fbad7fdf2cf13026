//! Leave balance ledger.
//!
//! Balances are reserved when a request is submitted and credited back when
//! it is rejected or cancelled. Approval moves no balance. Every status
//! change and its balance movement are written together by the store.

use crate::error::AppError;
use crate::model::employee::LeaveBalances;
use crate::model::leave_request::{
    LeaveCharge, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::store::LeaveStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

const HALF_DAY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubmittedLeave {
    pub id: u64,
    pub status: LeaveStatus,
    pub charge: LeaveCharge,
    pub remaining: LeaveBalances,
}

fn inclusive_days(from: NaiveDate, to: NaiveDate) -> f64 {
    ((to - from).num_days() + 1) as f64
}

fn charge(leave_type: LeaveType, is_half_day: bool, from: NaiveDate, to: NaiveDate) -> LeaveCharge {
    let days = if is_half_day {
        HALF_DAY
    } else {
        inclusive_days(from, to)
    };
    LeaveCharge { leave_type, days }
}

/// The amount a stored request reserved when it was submitted.
pub fn reserved_charge(leave: &LeaveRequest) -> LeaveCharge {
    charge(leave.leave_type, leave.is_half_day, leave.from_date, leave.to_date)
}

/// Validates a submission against the current balances without writing anything.
pub fn plan_submission(
    balances: &LeaveBalances,
    request: &NewLeaveRequest,
) -> Result<LeaveCharge, AppError> {
    if request.reason.trim().is_empty() {
        return Err(AppError::validation("Please enter a reason."));
    }
    if request.to_date < request.from_date {
        return Err(AppError::validation("To date cannot be before From date."));
    }
    if request.is_half_day {
        if request.from_date != request.to_date {
            return Err(AppError::validation(
                "A half-day leave must start and end on the same date.",
            ));
        }
        if request.half_day_period.is_none() {
            return Err(AppError::validation(
                "Please choose morning or evening for a half-day leave.",
            ));
        }
    }

    let charge = charge(
        request.leave_type,
        request.is_half_day,
        request.from_date,
        request.to_date,
    );
    let available = balances.get(request.leave_type);
    if charge.days > available {
        return Err(AppError::InsufficientBalance {
            available,
            leave_type: request.leave_type,
        });
    }

    Ok(charge)
}

pub async fn submit_leave<S>(
    store: &S,
    employee_id: u64,
    request: &NewLeaveRequest,
) -> Result<SubmittedLeave, AppError>
where
    S: LeaveStore + ?Sized,
{
    let balances = store
        .balances(employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee profile not found"))?;

    let charge = plan_submission(&balances, request)?;
    let id = store.reserve(employee_id, request, charge).await?;

    let mut remaining = balances;
    *remaining.get_mut(charge.leave_type) -= charge.days;

    info!(
        leave_id = id,
        employee_id,
        leave_type = %charge.leave_type,
        days = charge.days,
        from = %request.from_date,
        to = %request.to_date,
        "Leave request submitted"
    );

    Ok(SubmittedLeave {
        id,
        status: LeaveStatus::Pending,
        charge,
        remaining,
    })
}

/// Cancels the caller's own pending request and returns the restored charge.
pub async fn cancel_leave<S>(
    store: &S,
    employee_id: u64,
    leave_id: u64,
) -> Result<LeaveCharge, AppError>
where
    S: LeaveStore + ?Sized,
{
    let leave = store
        .leave_request(leave_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    if leave.employee_id != employee_id {
        return Err(AppError::forbidden("You can only cancel your own leave requests"));
    }
    if !leave.is_pending() {
        return Err(AppError::validation("Only pending leave requests can be cancelled"));
    }

    let restore = reserved_charge(&leave);
    let settled = store
        .settle(leave.id, leave.employee_id, LeaveStatus::Cancelled, Some(restore))
        .await?;
    if !settled {
        return Err(AppError::conflict("Leave request was processed by someone else"));
    }

    info!(leave_id, employee_id, days = restore.days, "Leave request cancelled");
    Ok(restore)
}

/// Approves or rejects a pending request. Rejection restores the reserved days.
pub async fn review_leave<S>(
    store: &S,
    leave_id: u64,
    decision: ReviewDecision,
) -> Result<LeaveStatus, AppError>
where
    S: LeaveStore + ?Sized,
{
    let leave = store
        .leave_request(leave_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    if !leave.is_pending() {
        return Err(AppError::validation("Leave request already processed"));
    }

    let (status, restore) = match decision {
        ReviewDecision::Approve => (LeaveStatus::Approved, None),
        ReviewDecision::Reject => (LeaveStatus::Rejected, Some(reserved_charge(&leave))),
    };

    if !store.settle(leave.id, leave.employee_id, status, restore).await? {
        return Err(AppError::conflict("Leave request already processed"));
    }

    info!(leave_id, employee_id = leave.employee_id, status = %status, "Leave request reviewed");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::HalfDayPeriod;
    use crate::store::MockLeaveStore;
    use chrono::{TimeZone, Utc};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn balances() -> LeaveBalances {
        LeaveBalances { sick: 2.0, casual: 14.0 }
    }

    fn request(leave_type: LeaveType, from: u32, to: u32) -> NewLeaveRequest {
        NewLeaveRequest {
            from_date: d(from),
            to_date: d(to),
            reason: "Medical appointment".into(),
            leave_type,
            is_half_day: false,
            half_day_period: None,
        }
    }

    fn stored(status: LeaveStatus, from: u32, to: u32, is_half_day: bool) -> LeaveRequest {
        LeaveRequest {
            id: 9,
            employee_id: 3,
            from_date: d(from),
            to_date: d(to),
            reason: "Trip".into(),
            leave_type: LeaveType::Casual,
            is_half_day,
            half_day_period: is_half_day.then_some(HalfDayPeriod::Morning),
            status,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn charges_inclusive_day_count() {
        let charge = plan_submission(&balances(), &request(LeaveType::Casual, 12, 14)).unwrap();
        assert_eq!(charge, LeaveCharge { leave_type: LeaveType::Casual, days: 3.0 });
    }

    #[test]
    fn half_day_charges_half() {
        let mut req = request(LeaveType::Sick, 12, 12);
        req.is_half_day = true;
        req.half_day_period = Some(HalfDayPeriod::Evening);
        let charge = plan_submission(&LeaveBalances { sick: 0.5, casual: 0.0 }, &req).unwrap();
        assert_eq!(charge.days, 0.5);
    }

    #[test]
    fn half_day_needs_single_date_and_period() {
        let mut req = request(LeaveType::Sick, 12, 13);
        req.is_half_day = true;
        req.half_day_period = Some(HalfDayPeriod::Morning);
        assert!(matches!(plan_submission(&balances(), &req), Err(AppError::Validation(_))));

        req.to_date = d(12);
        req.half_day_period = None;
        assert!(matches!(plan_submission(&balances(), &req), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_reversed_range_and_blank_reason() {
        assert!(matches!(
            plan_submission(&balances(), &request(LeaveType::Casual, 14, 12)),
            Err(AppError::Validation(_))
        ));

        let mut req = request(LeaveType::Casual, 12, 12);
        req.reason = "   ".into();
        assert!(matches!(plan_submission(&balances(), &req), Err(AppError::Validation(_))));
    }

    #[test]
    fn balance_is_checked_against_the_requested_type() {
        // 3 sick days against a sick balance of 2
        let err = plan_submission(&balances(), &request(LeaveType::Sick, 12, 14)).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance { available, leave_type: LeaveType::Sick } if available == 2.0
        ));
        // exactly the balance is allowed
        assert!(plan_submission(&balances(), &request(LeaveType::Sick, 12, 13)).is_ok());
    }

    #[actix_web::test]
    async fn insufficient_balance_performs_no_writes() {
        let mut store = MockLeaveStore::new();
        store
            .expect_balances()
            .returning(|_| Ok(Some(LeaveBalances { sick: 2.0, casual: 14.0 })));
        store.expect_reserve().never();
        store.expect_settle().never();

        let result = submit_leave(&store, 3, &request(LeaveType::Sick, 12, 16)).await;
        assert!(matches!(result, Err(AppError::InsufficientBalance { .. })));
    }

    #[actix_web::test]
    async fn submission_reserves_the_charge() {
        let mut store = MockLeaveStore::new();
        store
            .expect_balances()
            .returning(|_| Ok(Some(LeaveBalances { sick: 2.0, casual: 14.0 })));
        store
            .expect_reserve()
            .withf(|employee_id, _, charge| {
                *employee_id == 3
                    && *charge == LeaveCharge { leave_type: LeaveType::Casual, days: 3.0 }
            })
            .times(1)
            .returning(|_, _, _| Ok(41));

        let submitted = submit_leave(&store, 3, &request(LeaveType::Casual, 12, 14))
            .await
            .unwrap();
        assert_eq!(submitted.id, 41);
        assert_eq!(submitted.status, LeaveStatus::Pending);
        assert_eq!(submitted.remaining, LeaveBalances { sick: 2.0, casual: 11.0 });
    }

    #[actix_web::test]
    async fn missing_profile_is_not_found() {
        let mut store = MockLeaveStore::new();
        store.expect_balances().returning(|_| Ok(None));
        store.expect_reserve().never();

        let result = submit_leave(&store, 3, &request(LeaveType::Casual, 12, 12)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn cancel_restores_exactly_what_was_reserved() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 15, false))));
        store
            .expect_settle()
            .withf(|leave_id, employee_id, status, restore| {
                *leave_id == 9
                    && *employee_id == 3
                    && *status == LeaveStatus::Cancelled
                    && *restore == Some(LeaveCharge { leave_type: LeaveType::Casual, days: 4.0 })
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let restored = cancel_leave(&store, 3, 9).await.unwrap();
        assert_eq!(restored.days, 4.0);
    }

    #[actix_web::test]
    async fn cancel_half_day_restores_half() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 12, true))));
        store
            .expect_settle()
            .withf(|_, _, _, restore| restore.map(|c| c.days) == Some(0.5))
            .returning(|_, _, _, _| Ok(true));

        assert_eq!(cancel_leave(&store, 3, 9).await.unwrap().days, 0.5);
    }

    #[actix_web::test]
    async fn cancelling_a_processed_request_is_rejected() {
        for status in [LeaveStatus::Approved, LeaveStatus::Rejected, LeaveStatus::Cancelled] {
            let mut store = MockLeaveStore::new();
            store
                .expect_leave_request()
                .returning(move |_| Ok(Some(stored(status, 12, 13, false))));
            store.expect_settle().never();

            let result = cancel_leave(&store, 3, 9).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{status}");
        }
    }

    #[actix_web::test]
    async fn cannot_cancel_someone_elses_request() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 13, false))));
        store.expect_settle().never();

        let result = cancel_leave(&store, 4, 9).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn lost_race_on_cancel_is_reported() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 13, false))));
        store.expect_settle().returning(|_, _, _, _| Ok(false));

        let result = cancel_leave(&store, 3, 9).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn approval_moves_no_balance() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 13, false))));
        store
            .expect_settle()
            .withf(|_, _, status, restore| *status == LeaveStatus::Approved && restore.is_none())
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let status = review_leave(&store, 9, ReviewDecision::Approve).await.unwrap();
        assert_eq!(status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn rejection_restores_the_reserved_days() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Pending, 12, 13, false))));
        store
            .expect_settle()
            .withf(|_, employee_id, status, restore| {
                *employee_id == 3
                    && *status == LeaveStatus::Rejected
                    && *restore == Some(LeaveCharge { leave_type: LeaveType::Casual, days: 2.0 })
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let status = review_leave(&store, 9, ReviewDecision::Reject).await.unwrap();
        assert_eq!(status, LeaveStatus::Rejected);
    }

    #[actix_web::test]
    async fn reviewing_twice_is_rejected() {
        let mut store = MockLeaveStore::new();
        store
            .expect_leave_request()
            .returning(|_| Ok(Some(stored(LeaveStatus::Approved, 12, 13, false))));
        store.expect_settle().never();

        let result = review_leave(&store, 9, ReviewDecision::Reject).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
