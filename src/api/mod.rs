pub mod attendance;
pub mod employee;
pub mod leave_request;

use chrono::{Local, NaiveDateTime};

use crate::auth::auth::AuthUser;
use crate::engine::approval::{accessible_employees, can_view_employee};
use crate::error::{BusinessRuleViolation, EngineError};
use crate::model::employee::Employee;
use crate::store::Store;
use crate::store::mysql::MySqlStore;

/// Wall-clock time the engines see for this request.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Stored employee record of the caller.
pub(crate) async fn current_employee(
    store: &MySqlStore,
    auth: &AuthUser,
) -> actix_web::Result<Employee> {
    let id = auth.employee_id()?;
    let employee = store
        .get_employee(id)
        .await
        .map_err(EngineError::from)?
        .ok_or(EngineError::NotFound("employee", id))?;
    Ok(employee)
}

/// One employee if requested and visible, otherwise everyone the caller may see.
pub(crate) async fn visible_targets(
    store: &MySqlStore,
    viewer: &Employee,
    employee_id: Option<u64>,
) -> actix_web::Result<Vec<Employee>> {
    match employee_id {
        Some(id) if id == viewer.id => Ok(vec![viewer.clone()]),
        Some(id) => {
            let target = store
                .get_employee(id)
                .await
                .map_err(EngineError::from)?
                .ok_or(EngineError::NotFound("employee", id))?;
            if !can_view_employee(viewer, &target) {
                return Err(EngineError::from(BusinessRuleViolation::NotAuthorized).into());
            }
            Ok(vec![target])
        }
        None => {
            let all = store.list_employees().await.map_err(EngineError::from)?;
            Ok(accessible_employees(viewer, all))
        }
    }
}
