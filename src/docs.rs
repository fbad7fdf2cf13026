use crate::api::attendance::{CheckInRequest, TodayResponse};
use crate::api::employee::{CreateEmployee, CreatedEmployee};
use crate::api::leave_request::{CancelResponse, LeaveFilter, LeaveListResponse};
use crate::api::report::{DailyReportResponse, MonthlyReportResponse};
use crate::api::work_summary::{NewWorkItem, UpdateHandledTasks, WorkSummaryResponse};
use crate::model::attendance::{Attendance, OpenAttendance};
use crate::model::employee::{EmployeeProfile, LeaveBalances};
use crate::model::leave_request::{
    HalfDayPeriod, LeaveCharge, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::model::role::Role;
use crate::model::work_summary::WorkSummaryEntry;
use crate::models::{LoginReqDto, TokenPair};
use crate::report::classify::DayStatus;
use crate::report::daily::DailyStatusRow;
use crate::report::monthly::MonthlySummary;
use crate::service::attendance::{AttendanceState, TodayAttendance};
use crate::service::auto_checkout::{SweepPreview, SweepResult};
use crate::service::ledger::SubmittedLeave;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Hub API",
        version = "1.0.0",
        description = r#"
## Attendance & Leave Management

Employees check in and out, request leave and log their monthly work;
administrators review attendance, decide on leave and provision accounts.

### Key Features
- **Attendance**: one check-in and one check-out per local day, with an end-of-day auto checkout
- **Leave**: sick and casual balances reserved on submission, restored on cancellation or rejection
- **Reports**: monthly and daily status per employee, skipping weekends and holidays
- **Work Summary**: per-month task counts

### Security
Endpoints under the API prefix require a **JWT Bearer** access token. Admin routes
live under `/admin`; self-service routes are for employees only.
`/auto-checkout` also accepts the scheduler's shared secret.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::me,

        crate::api::report::monthly,
        crate::api::report::daily,

        crate::api::work_summary::my_summary,
        crate::api::work_summary::add_item,
        crate::api::work_summary::update_item,
        crate::api::work_summary::delete_item,
        crate::api::work_summary::employee_summary,

        crate::api::auto_checkout::preview,
        crate::api::auto_checkout::execute
    ),
    components(
        schemas(
            LoginReqDto,
            TokenPair,
            Role,
            EmployeeProfile,
            LeaveBalances,
            CreateEmployee,
            CreatedEmployee,
            Attendance,
            OpenAttendance,
            CheckInRequest,
            AttendanceState,
            TodayAttendance,
            TodayResponse,
            LeaveType,
            LeaveStatus,
            HalfDayPeriod,
            LeaveRequest,
            NewLeaveRequest,
            LeaveCharge,
            SubmittedLeave,
            CancelResponse,
            LeaveFilter,
            LeaveListResponse,
            DayStatus,
            MonthlySummary,
            MonthlyReportResponse,
            DailyStatusRow,
            DailyReportResponse,
            WorkSummaryEntry,
            NewWorkItem,
            UpdateHandledTasks,
            WorkSummaryResponse,
            SweepPreview,
            SweepResult
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token rotation"),
        (name = "Attendance", description = "Check-in and check-out"),
        (name = "Leave", description = "Leave requests and balances"),
        (name = "Employee", description = "Accounts and profiles"),
        (name = "Reports", description = "Attendance reports"),
        (name = "Work Summary", description = "Monthly work logs"),
        (name = "Auto Checkout", description = "End-of-day sweep"),
    )
)]
pub struct ApiDoc;

/// Prefix the protected paths are declared under.
const DECLARED_PREFIX: &str = "/api";

/// The OpenAPI document with protected paths moved under `api_prefix`.
pub fn api_doc(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');
    if prefix == DECLARED_PREFIX {
        return doc;
    }

    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DECLARED_PREFIX) {
            Some(rest) if rest.starts_with('/') => (format!("{prefix}{rest}"), item),
            _ => (path, item),
        })
        .collect();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/api/leave",
            "/api/leave/{leave_id}/cancel",
            "/api/admin/reports/monthly",
            "/api/work-summary/{id}",
            "/auto-checkout",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn paths_follow_the_configured_prefix() {
        let doc = api_doc("/v2/");
        assert!(doc.paths.paths.contains_key("/v2/leave/{leave_id}/cancel"));
        assert!(doc.paths.paths.contains_key("/v2/admin/reports/daily"));
        assert!(!doc.paths.paths.keys().any(|p| p.starts_with("/api/")));
        assert!(doc.paths.paths.contains_key("/auth/login"));
        assert!(doc.paths.paths.contains_key("/auto-checkout"));

        assert_eq!(api_doc("/api").paths.paths.len(), ApiDoc::openapi().paths.paths.len());
    }
}
