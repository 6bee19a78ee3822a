use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

impl TryFrom<String> for AttendanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One employee's attendance for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-01T09:15:00", format = "date-time", value_type = Option<String>)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-01T18:00:00", format = "date-time", value_type = Option<String>)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = 7.75)]
    pub working_hours: f64,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn is_checked_in(&self) -> bool {
        self.check_in.is_some()
    }

    pub fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }
}

/// Attendance row before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub status: AttendanceStatus,
    pub working_hours: f64,
}

/// A working day with no stored record. Built on read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MissingDay {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub date: NaiveDate,
}

/// Rolled-up counts over a set of attendance records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub half_day: usize,
    pub total_hours: f64,
    pub average_hours: f64,
}
