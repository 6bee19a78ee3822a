use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use tracing::{debug, info, instrument};

use crate::config::{MissingReport, WorkPolicy};
use crate::error::{BusinessRuleViolation, EngineError, EngineResult, StoreError};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, MissingDay, NewAttendance,
};
use crate::model::employee::Employee;
use crate::store::Store;

/// Days longer than this lose one unpaid lunch hour.
pub const LUNCH_THRESHOLD_HOURS: f64 = 4.0;
pub const LUNCH_BREAK_HOURS: f64 = 1.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn raw_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    (check_out - check_in).num_milliseconds() as f64 / 3_600_000.0
}

fn deduct_lunch(raw: f64) -> f64 {
    let hours = if raw > LUNCH_THRESHOLD_HOURS {
        raw - LUNCH_BREAK_HOURS
    } else {
        raw
    };
    hours.max(0.0)
}

/// Worked hours after the lunch deduction, floored at zero, two decimals.
pub fn calculate_working_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    round2(deduct_lunch(raw_hours(check_in, check_out)))
}

/// Classify a finished day. Lateness only looks at the check-in hour.
pub fn determine_status(
    check_in: NaiveDateTime,
    working_hours: f64,
    policy: &WorkPolicy,
) -> AttendanceStatus {
    if working_hours >= policy.full_day_hours {
        if check_in.hour() > policy.start_hour {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    } else if working_hours >= policy.half_day_hours {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Absent
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays in the lookback window (today excluded) with no record, newest first.
pub fn missing_days<'a, I>(employees: I, today: NaiveDate, report: &MissingReport) -> Vec<MissingDay>
where
    I: IntoIterator<Item = (&'a Employee, &'a [AttendanceRecord])>,
{
    let mut missing = Vec::new();

    for (employee, records) in employees {
        for back in 1..=i64::from(report.lookback_days) {
            let date = today - Duration::days(back);
            if is_weekend(date) || !employee.employed_on(date) {
                continue;
            }
            if records.iter().any(|r| r.date == date) {
                continue;
            }
            missing.push(MissingDay {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                date,
            });
        }
    }

    missing.sort_by(|a, b| b.date.cmp(&a.date));
    missing.truncate(report.limit);
    missing
}

pub fn summarize(records: &[AttendanceRecord]) -> AttendanceSummary {
    let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count();

    let worked: Vec<f64> = records
        .iter()
        .filter(|r| r.status != AttendanceStatus::Absent && r.working_hours > 0.0)
        .map(|r| r.working_hours)
        .collect();
    let total_hours: f64 = worked.iter().sum();

    AttendanceSummary {
        present: count(AttendanceStatus::Present),
        absent: count(AttendanceStatus::Absent),
        late: count(AttendanceStatus::Late),
        half_day: count(AttendanceStatus::HalfDay),
        total_hours,
        average_hours: if worked.is_empty() {
            0.0
        } else {
            total_hours / worked.len() as f64
        },
    }
}

/// Check-in/check-out transitions: `NoRecord -> CheckedIn -> CheckedOut`.
pub struct AttendanceEngine<'a, S> {
    store: &'a S,
    policy: &'a WorkPolicy,
}

impl<'a, S: Store> AttendanceEngine<'a, S> {
    pub fn new(store: &'a S, policy: &'a WorkPolicy) -> Self {
        Self { store, policy }
    }

    async fn require_employee(&self, employee_id: u64) -> EngineResult<Employee> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee", employee_id))
    }

    #[instrument(name = "attendance_check_in", skip(self))]
    pub async fn check_in(&self, employee_id: u64, now: NaiveDateTime) -> EngineResult<AttendanceRecord> {
        self.require_employee(employee_id).await?;
        let today = now.date();

        match self.store.attendance_on(employee_id, today).await? {
            Some(existing) if existing.is_checked_in() => {
                Err(BusinessRuleViolation::AlreadyCheckedIn.into())
            }
            Some(mut existing) => {
                debug!(attendance_id = existing.id, "Reusing today's record");
                existing.check_in = Some(now);
                existing.status = AttendanceStatus::Present;
                existing.working_hours = 0.0;
                self.store.update_attendance(&existing).await?;
                info!(attendance_id = existing.id, "Checked in");
                Ok(existing)
            }
            None => {
                let new = NewAttendance {
                    employee_id,
                    date: today,
                    check_in: now,
                    status: AttendanceStatus::Present,
                    working_hours: 0.0,
                };
                let record = self.store.create_attendance(&new).await.map_err(|e| match e {
                    StoreError::Duplicate => BusinessRuleViolation::AlreadyCheckedIn.into(),
                    other => EngineError::Store(other),
                })?;
                info!(attendance_id = record.id, "Checked in");
                Ok(record)
            }
        }
    }

    #[instrument(name = "attendance_check_out", skip(self))]
    pub async fn check_out(&self, employee_id: u64, now: NaiveDateTime) -> EngineResult<AttendanceRecord> {
        let mut record = self
            .store
            .attendance_on(employee_id, now.date())
            .await?
            .filter(AttendanceRecord::is_checked_in)
            .ok_or(BusinessRuleViolation::NotCheckedIn)?;

        if record.is_checked_out() {
            return Err(BusinessRuleViolation::AlreadyCheckedOut.into());
        }
        let Some(check_in) = record.check_in else {
            return Err(BusinessRuleViolation::NotCheckedIn.into());
        };
        if now <= check_in {
            return Err(EngineError::Validation(
                "check-out must be after check-in".to_string(),
            ));
        }

        let hours = deduct_lunch(raw_hours(check_in, now));
        record.check_out = Some(now);
        record.working_hours = round2(hours);
        record.status = determine_status(check_in, hours, self.policy);

        self.store.update_attendance(&record).await?;
        info!(
            attendance_id = record.id,
            working_hours = record.working_hours,
            status = %record.status,
            "Checked out"
        );
        Ok(record)
    }

    /// Stored records for the given employees between `from` and `to`, newest first.
    pub async fn records(
        &self,
        employees: &[Employee],
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        if from > to {
            return Err(EngineError::Validation(
                "from cannot be after to".to_string(),
            ));
        }
        let mut all = Vec::new();
        for employee in employees {
            all.extend(self.store.attendance_between(employee.id, from, to).await?);
        }
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    /// Reporting-only view of days without a record.
    pub async fn missing(
        &self,
        employees: &[Employee],
        today: NaiveDate,
        report: &MissingReport,
    ) -> EngineResult<Vec<MissingDay>> {
        let from = today - Duration::days(i64::from(report.lookback_days));
        let mut history = Vec::with_capacity(employees.len());
        for employee in employees {
            let records = self.store.attendance_between(employee.id, from, today).await?;
            history.push((employee, records));
        }
        Ok(missing_days(
            history.iter().map(|(e, r)| (*e, r.as_slice())),
            today,
            report,
        ))
    }
}
