use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use super::approval::{approvable_requests, can_approve};
use super::notify::{self, Notifier};
use crate::config::LeaveAllotment;
use crate::error::{BusinessRuleViolation, EngineError, EngineResult};
use crate::model::employee::Employee;
use crate::model::leave_request::{
    Decision, LeaveApplication, LeaveBalance, LeaveRequest, LeaveStats, LeaveStatus, NewLeave,
};
use crate::store::Store;

/// Pending plus approved requests allowed per employee per start month. Not configurable.
pub const MONTHLY_LEAVE_LIMIT: usize = 4;

/// Inclusive day count. Weekends and holidays are counted.
pub fn calculate_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// True while the employee still has room in the quota month of `start`.
pub fn within_monthly_limit(leaves: &[LeaveRequest], employee_id: u64, start: NaiveDate) -> bool {
    let used = leaves
        .iter()
        .filter(|l| {
            l.employee_id == employee_id
                && l.status.counts_toward_quota()
                && same_month(l.start_date, start)
        })
        .count();
    used < MONTHLY_LEAVE_LIMIT
}

/// Allotment minus approved days starting in `year`. Not clamped at zero.
pub fn calculate_leave_balance(
    allotment: &LeaveAllotment,
    leaves: &[LeaveRequest],
    employee_id: u64,
    year: i32,
) -> LeaveBalance {
    let mut remaining = allotment.0.clone();
    for leave in leaves.iter().filter(|l| {
        l.employee_id == employee_id
            && l.status == LeaveStatus::Approved
            && l.start_date.year() == year
    }) {
        if let Some(left) = remaining.get_mut(&leave.leave_type) {
            *left -= leave.days;
        }
    }
    LeaveBalance { year, remaining }
}

pub fn leave_stats(leaves: &[LeaveRequest]) -> LeaveStats {
    let mut stats = LeaveStats::default();
    for leave in leaves {
        match leave.status {
            LeaveStatus::Pending => stats.pending += 1,
            LeaveStatus::Approved => stats.approved += 1,
            LeaveStatus::Rejected => stats.rejected += 1,
            LeaveStatus::Cancelled => {}
        }
        *stats.by_type.entry(leave.leave_type).or_default() += 1;
    }
    stats
}

fn require_pending(leave: &LeaveRequest) -> Result<(), BusinessRuleViolation> {
    if leave.status == LeaveStatus::Pending {
        Ok(())
    } else {
        Err(BusinessRuleViolation::InvalidStatusTransition {
            from: leave.status.to_string(),
        })
    }
}

/// Result of a review: the updated request and the submitter's recomputed balance.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewOutcome {
    pub leave: LeaveRequest,
    pub balance: LeaveBalance,
}

pub struct LeaveEngine<'a, S, N> {
    store: &'a S,
    notifier: &'a N,
    allotment: &'a LeaveAllotment,
}

impl<'a, S: Store, N: Notifier> LeaveEngine<'a, S, N> {
    pub fn new(store: &'a S, notifier: &'a N, allotment: &'a LeaveAllotment) -> Self {
        Self {
            store,
            notifier,
            allotment,
        }
    }

    async fn require_employee(&self, employee_id: u64) -> EngineResult<Employee> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee", employee_id))
    }

    async fn require_leave(&self, leave_id: u64) -> EngineResult<LeaveRequest> {
        self.store
            .get_leave(leave_id)
            .await?
            .ok_or(EngineError::NotFound("leave request", leave_id))
    }

    /// Reads the current requests; the answer can be stale by the time it is used.
    pub async fn check_monthly_limit(&self, employee_id: u64, start: NaiveDate) -> EngineResult<bool> {
        let leaves = self.store.leaves_for_employee(employee_id).await?;
        Ok(within_monthly_limit(&leaves, employee_id, start))
    }

    #[instrument(name = "leave_apply", skip(self, application), fields(leave_type = %application.leave_type))]
    pub async fn apply_leave(
        &self,
        employee_id: u64,
        application: LeaveApplication,
        now: NaiveDateTime,
    ) -> EngineResult<LeaveRequest> {
        if application.start_date > application.end_date {
            return Err(EngineError::Validation(
                "start_date cannot be after end_date".to_string(),
            ));
        }
        let reason = application.reason.trim();
        if reason.is_empty() {
            return Err(EngineError::Validation("reason is required".to_string()));
        }

        let applicant = self.require_employee(employee_id).await?;

        if !self
            .check_monthly_limit(employee_id, application.start_date)
            .await?
        {
            info!("Monthly leave limit reached");
            return Err(BusinessRuleViolation::MonthlyLimitExceeded {
                limit: MONTHLY_LEAVE_LIMIT,
                month: application.start_date.format("%B %Y").to_string(),
            }
            .into());
        }

        let new = NewLeave {
            employee_id,
            employee_reporting_head_id: applicant.reporting_head_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            days: calculate_days(application.start_date, application.end_date),
            reason: reason.to_string(),
            applied_date: now,
        };
        let leave = self.store.create_leave(&new).await?;
        info!(leave_id = leave.id, days = leave.days, "Leave request submitted");

        match notify::leave_submitted(&leave, &applicant) {
            Some(n) => notify::dispatch(self.notifier, n).await,
            None => debug!(leave_id = leave.id, "No reporting head to notify"),
        }
        Ok(leave)
    }

    /// Moves a pending request to approved or rejected and stamps the reviewer.
    async fn update_status(
        &self,
        mut leave: LeaveRequest,
        reviewer_id: u64,
        decision: Decision,
        comments: Option<String>,
        now: NaiveDateTime,
    ) -> EngineResult<LeaveRequest> {
        require_pending(&leave)?;
        leave.status = decision.status();
        leave.reviewed_by = Some(reviewer_id);
        leave.reviewed_date = Some(now);
        leave.reviewer_comments = comments.filter(|c| !c.trim().is_empty());
        self.store.update_leave(&leave).await?;
        Ok(leave)
    }

    #[instrument(name = "leave_review", skip(self, comments))]
    pub async fn review_leave(
        &self,
        reviewer_id: u64,
        leave_id: u64,
        decision: Decision,
        comments: Option<String>,
        now: NaiveDateTime,
    ) -> EngineResult<ReviewOutcome> {
        let reviewer = self.require_employee(reviewer_id).await?;
        let leave = self.require_leave(leave_id).await?;

        require_pending(&leave)?;
        if !can_approve(&reviewer, &leave) {
            warn!(
                reviewer_role = %reviewer.role,
                snapshot_head = ?leave.employee_reporting_head_id,
                "Reviewer not entitled to this request"
            );
            return Err(BusinessRuleViolation::NotAuthorized.into());
        }

        let leave = self
            .update_status(leave, reviewer_id, decision, comments, now)
            .await?;
        info!(status = %leave.status, "Leave request reviewed");

        if let Some(n) = notify::leave_reviewed(&leave) {
            notify::dispatch(self.notifier, n).await;
        }

        let balance = self.balance(leave.employee_id, now.year()).await?;
        Ok(ReviewOutcome { leave, balance })
    }

    #[instrument(name = "leave_cancel", skip(self))]
    pub async fn cancel_leave(
        &self,
        employee_id: u64,
        leave_id: u64,
        now: NaiveDateTime,
    ) -> EngineResult<LeaveRequest> {
        let mut leave = self.require_leave(leave_id).await?;
        if leave.employee_id != employee_id {
            return Err(BusinessRuleViolation::NotAuthorized.into());
        }
        require_pending(&leave)?;

        leave.status = LeaveStatus::Cancelled;
        leave.cancelled_date = Some(now);
        self.store.update_leave(&leave).await?;
        info!("Leave request cancelled");
        Ok(leave)
    }

    pub async fn balance(&self, employee_id: u64, year: i32) -> EngineResult<LeaveBalance> {
        let leaves = self.store.leaves_for_employee(employee_id).await?;
        Ok(calculate_leave_balance(self.allotment, &leaves, employee_id, year))
    }

    pub async fn approvable_requests(&self, reviewer_id: u64) -> EngineResult<Vec<LeaveRequest>> {
        let reviewer = self.require_employee(reviewer_id).await?;
        if !reviewer.role.is_supervisor() {
            return Ok(Vec::new());
        }
        let pending = self.store.pending_leaves().await?;
        Ok(approvable_requests(&reviewer, pending))
    }
}
