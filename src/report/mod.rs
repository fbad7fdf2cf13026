pub mod classify;
pub mod daily;
pub mod monthly;
