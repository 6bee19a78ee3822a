use std::sync::RwLock;

use chrono::NaiveDate;

use super::{Store, StoreResult};
use crate::engine::notify::{Notification, Notifier};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave};

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
    leaves: Vec<LeaveRequest>,
    notifications: Vec<Notification>,
}

/// Store double for engine tests. Mirrors the unique (employee, date) key.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: RwLock<bool>,
    failing_notifier: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent store call fail.
    pub fn fail_all_calls(&self) {
        *self.failing.write().unwrap() = true;
    }

    pub fn fail_notifications(&self) {
        *self.failing_notifier.write().unwrap() = true;
    }

    pub fn add_employee(&self, employee: Employee) {
        self.tables.write().unwrap().employees.push(employee);
    }

    /// Insert a leave as-is, bypassing the engine.
    pub fn seed_leave(&self, leave: LeaveRequest) {
        self.tables.write().unwrap().leaves.push(leave);
    }

    pub fn seed_attendance(&self, record: AttendanceRecord) {
        self.tables.write().unwrap().attendance.push(record);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables.read().unwrap().notifications.clone()
    }

    pub fn attendance_count(&self) -> usize {
        self.tables.read().unwrap().attendance.len()
    }

    fn check(&self) -> StoreResult<()> {
        if *self.failing.read().unwrap() {
            return Err(StoreError::Unavailable("permission denied".into()));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    async fn create_employee(&self, e: &NewEmployee) -> StoreResult<Employee> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        let employee = Employee {
            id: t.employees.len() as u64 + 1,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            role: e.role,
            reporting_head_id: e.reporting_head_id,
            join_date: e.join_date,
            last_working_day: None,
            active: true,
        };
        t.employees.push(employee.clone());
        Ok(employee)
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        self.check()?;
        Ok(self.tables.read().unwrap().employees.clone())
    }

    async fn update_employee(&self, employee: &Employee) -> StoreResult<()> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        if let Some(slot) = t.employees.iter_mut().find(|e| e.id == employee.id) {
            *slot = employee.clone();
        }
        Ok(())
    }

    async fn attendance_on(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.attendance
            .iter()
            .find(|a| a.employee_id == employee_id && a.date == date)
            .cloned())
    }

    async fn attendance_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && a.date >= from && a.date <= to)
            .cloned()
            .collect())
    }

    async fn create_attendance(&self, r: &NewAttendance) -> StoreResult<AttendanceRecord> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        if t.attendance
            .iter()
            .any(|a| a.employee_id == r.employee_id && a.date == r.date)
        {
            return Err(StoreError::Duplicate);
        }
        let record = AttendanceRecord {
            id: t.attendance.len() as u64 + 1,
            employee_id: r.employee_id,
            date: r.date,
            check_in: Some(r.check_in),
            check_out: None,
            working_hours: r.working_hours,
            status: r.status,
        };
        t.attendance.push(record.clone());
        Ok(record)
    }

    async fn update_attendance(&self, record: &AttendanceRecord) -> StoreResult<()> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        if let Some(slot) = t.attendance.iter_mut().find(|a| a.id == record.id) {
            *slot = record.clone();
        }
        Ok(())
    }

    async fn create_leave(&self, l: &NewLeave) -> StoreResult<LeaveRequest> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        let leave = l.clone().with_id(t.leaves.len() as u64 + 1);
        t.leaves.push(leave.clone());
        Ok(leave)
    }

    async fn get_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn update_leave(&self, leave: &LeaveRequest) -> StoreResult<()> {
        self.check()?;
        let mut t = self.tables.write().unwrap();
        if let Some(slot) = t.leaves.iter_mut().find(|l| l.id == leave.id) {
            *slot = leave.clone();
        }
        Ok(())
    }

    async fn leaves_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.leaves
            .iter()
            .filter(|l| l.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn pending_leaves(&self) -> StoreResult<Vec<LeaveRequest>> {
        self.check()?;
        let t = self.tables.read().unwrap();
        Ok(t.leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Pending)
            .cloned()
            .collect())
    }
}

impl Notifier for MemoryStore {
    async fn notify(&self, n: &Notification) -> Result<(), StoreError> {
        if *self.failing_notifier.read().unwrap() {
            return Err(StoreError::Unavailable("push channel down".into()));
        }
        self.tables.write().unwrap().notifications.push(n.clone());
        Ok(())
    }
}
