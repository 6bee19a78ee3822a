use crate::api::attendance::{AttendanceListResponse, AttendanceQuery};
use crate::api::employee::{EmployeeListResponse, EmployeeQuery};
use crate::api::leave_request::{BalanceQuery, LeaveFilter, ReviewBody};
use crate::engine::leave::ReviewOutcome;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary, MissingDay};
use crate::model::employee::{Employee, EmployeePatch, NewEmployee};
use crate::model::leave_request::{
    LeaveApplication, LeaveBalance, LeaveRequest, LeaveStats, LeaveStatus, LeaveType,
};
use crate::model::role::Role;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Engine API",
        version = "1.0.0",
        description = r#"
## HR rule engine

Attendance, leave and approval rules for a small organization.

### 🔹 Key Features
- **Attendance**
  - Daily check-in and check-out, working hours with lunch deduction, late and half-day status
  - Missing weekdays reported (never stored)
- **Leave**
  - Apply, review and cancel requests
  - At most 4 pending or approved requests per calendar month
  - Yearly balance per leave type
- **Approval**
  - Admins review everything, managers review requests naming them as reporting head

### 🔐 Security
Every endpoint requires a **JWT Bearer** token carrying the caller's role and employee id.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_list,
        crate::api::attendance::attendance_summary,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::leave_balance,
        crate::api::leave_request::approvable_leaves,
        crate::api::leave_request::leave_statistics,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::team,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceSummary,
            MissingDay,
            AttendanceQuery,
            AttendanceListResponse,
            LeaveRequest,
            LeaveApplication,
            LeaveType,
            LeaveStatus,
            LeaveBalance,
            LeaveStats,
            LeaveFilter,
            BalanceQuery,
            ReviewBody,
            ReviewOutcome,
            Employee,
            NewEmployee,
            EmployeePatch,
            EmployeeQuery,
            EmployeeListResponse,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in, check-out and attendance reports"),
        (name = "Leave", description = "Leave requests, review and balances"),
        (name = "Employee", description = "Employee directory"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
