use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Casual,
    Earned,
    Maternity,
    Paternity,
}

impl TryFrom<String> for LeaveType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl TryFrom<String> for LeaveStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl LeaveStatus {
    /// Statuses that count toward the monthly quota.
    pub fn counts_toward_quota(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

/// Outcome a reviewer can choose.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(&self) -> LeaveStatus {
        match self {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "employee_reporting_head_id": 7,
    "leave_type": "sick",
    "start_date": "2026-01-01",
    "end_date": "2026-01-03",
    "days": 3,
    "reason": "flu",
    "status": "pending",
    "applied_date": "2026-01-01T08:00:00",
    "reviewed_by": null,
    "reviewed_date": null,
    "reviewer_comments": null,
    "cancelled_date": null
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    /// Reporting head at submission time. Never refreshed.
    pub employee_reporting_head_id: Option<u64>,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveType,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub days: i64,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    #[schema(format = "date-time", value_type = String)]
    pub applied_date: NaiveDateTime,
    pub reviewed_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub reviewed_date: Option<NaiveDateTime>,
    pub reviewer_comments: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub cancelled_date: Option<NaiveDateTime>,
}

/// What an employee submits when applying for leave.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-20", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-21", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
}

/// Leave row before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: u64,
    pub employee_reporting_head_id: Option<u64>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub reason: String,
    pub applied_date: NaiveDateTime,
}

impl NewLeave {
    pub fn with_id(self, id: u64) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: self.employee_id,
            employee_reporting_head_id: self.employee_reporting_head_id,
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            days: self.days,
            reason: self.reason,
            status: LeaveStatus::Pending,
            applied_date: self.applied_date,
            reviewed_by: None,
            reviewed_date: None,
            reviewer_comments: None,
            cancelled_date: None,
        }
    }
}

/// Remaining days per tracked leave type. May go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub year: i32,
    #[schema(value_type = Object, example = json!({"sick": 10, "casual": -2}))]
    pub remaining: BTreeMap<LeaveType, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    #[schema(value_type = Object, example = json!({"sick": 2}))]
    pub by_type: BTreeMap<LeaveType, usize>,
}
