pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod role;
pub mod user;
pub mod work_summary;
