pub mod attendance;
pub mod auto_checkout;
pub mod employee;
pub mod leave_request;
pub mod report;
pub mod work_summary;

use chrono::{Local, NaiveDate};

/// Calendar date in the server's local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
