use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::debug;

use super::{Store, StoreResult};
use crate::engine::notify::{Notification, Notifier};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave_request::{LeaveRequest, NewLeave};

const EMPLOYEE_COLUMNS: &str = r#"
    id, first_name, last_name, email, department, role,
    reporting_head_id, join_date, last_working_day, active
"#;

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, date, check_in, check_out, working_hours, status
"#;

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, employee_reporting_head_id, leave_type, start_date, end_date,
    days, reason, status, applied_date, reviewed_by, reviewed_date,
    reviewer_comments, cancelled_date
"#;

/// MySQL-backed store with an in-memory cache in front of employee reads.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    employees: Cache<u64, Employee>,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, employee_ttl: Duration) -> Self {
        Self {
            pool,
            employees: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(employee_ttl)
                .build(),
        }
    }
}

impl Store for MySqlStore {
    async fn create_employee(&self, e: &NewEmployee) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (first_name, last_name, email, department, role, reporting_head_id, join_date, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(&e.first_name)
        .bind(&e.last_name)
        .bind(&e.email)
        .bind(&e.department)
        .bind(e.role.as_ref())
        .bind(e.reporting_head_id)
        .bind(e.join_date)
        .execute(&self.pool)
        .await?;

        Ok(Employee {
            id: result.last_insert_id(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            role: e.role,
            reporting_head_id: e.reporting_head_id,
            join_date: e.join_date,
            last_working_day: None,
            active: true,
        })
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        if let Some(hit) = self.employees.get(&id).await {
            return Ok(Some(hit));
        }

        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let found = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(employee) = &found {
            self.employees.insert(id, employee.clone()).await;
        }
        Ok(found)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_employee(&self, e: &Employee) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, department = ?, role = ?,
                reporting_head_id = ?, join_date = ?, last_working_day = ?, active = ?
            WHERE id = ?
            "#,
        )
        .bind(&e.first_name)
        .bind(&e.last_name)
        .bind(&e.email)
        .bind(&e.department)
        .bind(e.role.as_ref())
        .bind(e.reporting_head_id)
        .bind(e.join_date)
        .bind(e.last_working_day)
        .bind(e.active)
        .bind(e.id)
        .execute(&self.pool)
        .await?;

        self.employees.invalidate(&e.id).await;
        debug!(employee_id = e.id, "Employee cache entry invalidated");
        Ok(())
    }

    async fn attendance_on(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?"
        );
        Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn attendance_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS} FROM attendance
            WHERE employee_id = ? AND date BETWEEN ? AND ?
            ORDER BY date DESC
            "#
        );
        Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_attendance(&self, r: &NewAttendance) -> StoreResult<AttendanceRecord> {
        // unique key (employee_id, date) turns a racing second check-in into StoreError::Duplicate
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, working_hours, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(r.employee_id)
        .bind(r.date)
        .bind(r.check_in)
        .bind(r.working_hours)
        .bind(r.status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            employee_id: r.employee_id,
            date: r.date,
            check_in: Some(r.check_in),
            check_out: None,
            working_hours: r.working_hours,
            status: r.status,
        })
    }

    async fn update_attendance(&self, r: &AttendanceRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE attendance
            SET check_in = ?, check_out = ?, working_hours = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(r.check_in)
        .bind(r.check_out)
        .bind(r.working_hours)
        .bind(r.status.as_ref())
        .bind(r.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_leave(&self, l: &NewLeave) -> StoreResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, employee_reporting_head_id, leave_type, start_date, end_date,
                 days, reason, status, applied_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(l.employee_id)
        .bind(l.employee_reporting_head_id)
        .bind(l.leave_type.as_ref())
        .bind(l.start_date)
        .bind(l.end_date)
        .bind(l.days)
        .bind(&l.reason)
        .bind(l.applied_date)
        .execute(&self.pool)
        .await?;

        Ok(l.clone().with_id(result.last_insert_id()))
    }

    async fn get_leave(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_leave(&self, l: &LeaveRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewed_by = ?, reviewed_date = ?, reviewer_comments = ?,
                cancelled_date = ?
            WHERE id = ?
            "#,
        )
        .bind(l.status.as_ref())
        .bind(l.reviewed_by)
        .bind(l.reviewed_date)
        .bind(&l.reviewer_comments)
        .bind(l.cancelled_date)
        .bind(l.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn leaves_for_employee(&self, employee_id: u64) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY applied_date DESC"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn pending_leaves(&self) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE status = 'pending' ORDER BY applied_date DESC"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}

impl Notifier for MySqlStore {
    async fn notify(&self, n: &Notification) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, kind, title, message, leave_id, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, FALSE, NOW())
            "#,
        )
        .bind(n.recipient_id)
        .bind(n.kind.as_ref())
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.leave_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
