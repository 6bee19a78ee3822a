//! Business rules for attendance and leave. No HTTP types in here.

pub mod approval;
pub mod attendance;
pub mod leave;
pub mod notify;
