use crate::model::leave_request::LeaveType;
use crate::model::role::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 12,
        "name": "Nimal Perera",
        "role": "employee",
        "created_at": "2026-01-10T03:30:00Z",
        "sick_leave_balance": 7.0,
        "casual_leave_balance": 13.5
    })
)]
pub struct EmployeeProfile {
    #[schema(example = 12)]
    pub id: u64,

    #[schema(example = "Nimal Perera")]
    pub name: String,

    #[sqlx(try_from = "String")]
    pub role: Role,

    /// Enrollment timestamp; its date part is the first counted day
    #[schema(example = "2026-01-10T03:30:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = 7.0)]
    pub sick_leave_balance: f64,

    #[schema(example = 13.5)]
    pub casual_leave_balance: f64,
}

impl EmployeeProfile {
    pub fn enrolled_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn balances(&self) -> LeaveBalances {
        LeaveBalances {
            sick: self.sick_leave_balance,
            casual: self.casual_leave_balance,
        }
    }
}

/// Remaining leave days per type. Values move in steps of 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveBalances {
    #[schema(example = 7.0)]
    pub sick: f64,
    #[schema(example = 14.0)]
    pub casual: f64,
}

impl LeaveBalances {
    pub fn get(&self, leave_type: LeaveType) -> f64 {
        match leave_type {
            LeaveType::Sick => self.sick,
            LeaveType::Casual => self.casual,
        }
    }

    pub fn get_mut(&mut self, leave_type: LeaveType) -> &mut f64 {
        match leave_type {
            LeaveType::Sick => &mut self.sick,
            LeaveType::Casual => &mut self.casual,
        }
    }
}
