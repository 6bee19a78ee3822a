//! Persistence collaborator used by the engines.
//!
//! The engines only ever read a snapshot, compute, then write. Nothing here is
//! transactional across calls.

pub mod mysql;

#[cfg(test)]
pub mod memory;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave_request::{LeaveRequest, NewLeave};

pub type StoreResult<T> = Result<T, StoreError>;

pub trait Store {
    async fn create_employee(&self, employee: &NewEmployee) -> StoreResult<Employee>;
    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn update_employee(&self, employee: &Employee) -> StoreResult<()>;

    async fn attendance_on(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;
    /// Records for one employee with `from <= date <= to`.
    async fn attendance_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;
    async fn create_attendance(&self, record: &NewAttendance) -> StoreResult<AttendanceRecord>;
    async fn update_attendance(&self, record: &AttendanceRecord) -> StoreResult<()>;

    async fn create_leave(&self, leave: &NewLeave) -> StoreResult<LeaveRequest>;
    async fn get_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>>;
    async fn update_leave(&self, leave: &LeaveRequest) -> StoreResult<()>;
    async fn leaves_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>>;
    async fn pending_leaves(&self) -> StoreResult<Vec<LeaveRequest>>;
}
