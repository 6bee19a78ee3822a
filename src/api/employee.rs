use crate::api::{current_employee, now};
use crate::auth::auth::AuthUser;
use crate::engine::approval::{accessible_employees, can_view_employee, team_of};
use crate::error::{BusinessRuleViolation, EngineError, StoreError};
use crate::model::employee::{Employee, EmployeePatch, NewEmployee};
use crate::model::role::Role;
use crate::store::Store;
use crate::store::mysql::MySqlStore;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = "Engineering")]
    pub department: Option<String>,

    #[schema(example = "manager")]
    #[param(value_type = Option<String>)]
    pub role: Option<Role>,

    /// Matches first name, last name or email
    #[schema(example = "john")]
    pub search: Option<String>,

    /// Include employees whose record was deactivated
    #[schema(example = false)]
    pub include_inactive: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: usize,
}

fn invalid(message: &str) -> actix_web::Error {
    EngineError::Validation(message.to_string()).into()
}

fn forbidden() -> actix_web::Error {
    EngineError::from(BusinessRuleViolation::NotAuthorized).into()
}

/// The unique email key is the only constraint a directory write can hit.
fn store_failure(e: StoreError) -> actix_web::Error {
    match e {
        StoreError::Duplicate => invalid("email is already registered"),
        other => EngineError::from(other).into(),
    }
}

/// Directory writes use the stored role; the token's role can be stale.
fn require_admin(actor: &Employee) -> actix_web::Result<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(forbidden())
    }
}

/// Admins edit anyone; managers edit their direct reports but never change roles.
fn authorize_update(
    editor: &Employee,
    target: &Employee,
    patch: &EmployeePatch,
) -> actix_web::Result<()> {
    match editor.role {
        Role::Admin => Ok(()),
        Role::Manager if target.reporting_head_id == Some(editor.id) && patch.role.is_none() => {
            Ok(())
        }
        _ => Err(forbidden()),
    }
}

fn validate_new_employee(e: &NewEmployee) -> Result<(), &'static str> {
    if e.first_name.trim().is_empty() || e.last_name.trim().is_empty() {
        return Err("first_name and last_name are required");
    }
    if !e.email.contains('@') {
        return Err("email is invalid");
    }
    if e.department.trim().is_empty() {
        return Err("department is required");
    }
    Ok(())
}

fn matches_query(e: &Employee, q: &EmployeeQuery) -> bool {
    if !e.active && !q.include_inactive.unwrap_or(false) {
        return false;
    }
    if let Some(department) = &q.department {
        if !e.department.eq_ignore_ascii_case(department) {
            return false;
        }
    }
    if let Some(role) = q.role {
        if e.role != role {
            return false;
        }
    }
    if let Some(search) = &q.search {
        let needle = search.to_lowercase();
        return [&e.first_name, &e.last_name, &e.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
    }
    true
}

async fn require_employee(store: &MySqlStore, id: u64) -> actix_web::Result<Employee> {
    let employee = store
        .get_employee(id)
        .await
        .map_err(EngineError::from)?
        .ok_or(EngineError::NotFound("employee", id))?;
    Ok(employee)
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid payload or unknown reporting head"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "database error"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    require_admin(&current_employee(&store, &auth).await?)?;

    let new = payload.into_inner();
    validate_new_employee(&new).map_err(invalid)?;
    if let Some(head_id) = new.reporting_head_id {
        if store
            .get_employee(head_id)
            .await
            .map_err(EngineError::from)?
            .is_none()
        {
            return Err(invalid("reporting head does not exist"));
        }
    }

    let employee = store.create_employee(&new).await.map_err(store_failure)?;
    info!(employee_id = employee.id, role = %employee.role, "Employee created");

    Ok(HttpResponse::Ok().json(employee))
}

/// List employees visible to the caller
#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employees", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let viewer = current_employee(&store, &auth).await?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let everyone = store.list_employees().await.map_err(EngineError::from)?;
    let mut visible: Vec<Employee> = accessible_employees(&viewer, everyone)
        .into_iter()
        .filter(|e| matches_query(e, &query))
        .collect();
    visible.sort_by(|a, b| b.id.cmp(&a.id));

    let total = visible.len();
    let data = visible
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Direct reports of the caller
#[utoipa::path(
    get,
    path = "/api/employee/team",
    responses(
        (status = 200, description = "Active direct reports", body = [Employee]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn team(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    let head = current_employee(&store, &auth).await?;
    let everyone = store.list_employees().await.map_err(EngineError::from)?;

    let reports: Vec<Employee> = team_of(&head, everyone)
        .into_iter()
        .filter(|e| e.active)
        .collect();

    Ok(HttpResponse::Ok().json(reports))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Not visible to caller"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 42 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let viewer = current_employee(&store, &auth).await?;
    let target = require_employee(&store, path.into_inner()).await?;

    if !can_view_employee(&viewer, &target) {
        return Err(forbidden());
    }

    Ok(HttpResponse::Ok().json(target))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = EmployeePatch,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid reporting head"),
        (status = 403, description = "Caller may not edit this employee"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    payload: web::Json<EmployeePatch>,
) -> actix_web::Result<impl Responder> {
    let editor = current_employee(&store, &auth).await?;
    let mut target = require_employee(&store, path.into_inner()).await?;
    let patch = payload.into_inner();

    authorize_update(&editor, &target, &patch)?;
    if let Some(Some(head_id)) = patch.reporting_head_id {
        if head_id == target.id {
            return Err(invalid("an employee cannot report to themselves"));
        }
        require_employee(&store, head_id)
            .await
            .map_err(|_| invalid("reporting head does not exist"))?;
    }
    if let Some(email) = &patch.email {
        if !email.contains('@') {
            return Err(invalid("email is invalid"));
        }
    }

    patch.apply(&mut target);
    store.update_employee(&target).await.map_err(store_failure)?;
    info!(employee_id = target.id, editor = editor.id, "Employee updated");

    Ok(HttpResponse::Ok().json(target))
}

/// Deactivate Employee
///
/// Records are kept; the employee stops appearing in missing-attendance reports
/// after the stamped last working day.
#[utoipa::path(
    delete,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deactivated", body = Object, example = json!({
            "message": "Successfully deactivated"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 42 not found"
        })),
        (status = 500, description = "Internal server error", body = Object)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    require_admin(&current_employee(&store, &auth).await?)?;
    let mut target = require_employee(&store, path.into_inner()).await?;

    if target.active {
        target.active = false;
        target.last_working_day = Some(now().date());
        store
            .update_employee(&target)
            .await
            .map_err(EngineError::from)?;
        info!(employee_id = target.id, "Employee deactivated");
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deactivated"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_employee() -> NewEmployee {
        NewEmployee {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@company.com".into(),
            department: "Engineering".into(),
            role: Role::Employee,
            reporting_head_id: Some(7),
            join_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    fn query() -> EmployeeQuery {
        EmployeeQuery {
            page: None,
            per_page: None,
            department: None,
            role: None,
            search: None,
            include_inactive: None,
        }
    }

    fn stored(active: bool) -> Employee {
        let n = new_employee();
        Employee {
            id: 3,
            first_name: n.first_name,
            last_name: n.last_name,
            email: n.email,
            department: n.department,
            role: n.role,
            reporting_head_id: n.reporting_head_id,
            join_date: n.join_date,
            last_working_day: None,
            active,
        }
    }

    fn staff(id: u64, role: Role, head: Option<u64>) -> Employee {
        Employee {
            id,
            role,
            reporting_head_id: head,
            ..stored(true)
        }
    }

    #[test]
    fn updates_authorized_by_stored_role() {
        let report = staff(5, Role::Employee, Some(7));
        let rename = EmployeePatch {
            department: Some("Sales".into()),
            ..Default::default()
        };
        let promote = EmployeePatch {
            role: Some(Role::Manager),
            ..Default::default()
        };

        let admin = staff(1, Role::Admin, None);
        assert!(authorize_update(&admin, &report, &promote).is_ok());

        let manager = staff(7, Role::Manager, Some(1));
        assert!(authorize_update(&manager, &report, &rename).is_ok());
        assert!(authorize_update(&manager, &report, &promote).is_err());
        assert!(authorize_update(&manager, &staff(6, Role::Employee, Some(8)), &rename).is_err());

        // demoted since the token was issued
        let demoted = staff(7, Role::Employee, Some(1));
        assert!(authorize_update(&demoted, &report, &rename).is_err());
        assert!(require_admin(&demoted).is_err());
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn new_employee_needs_names_email_and_department() {
        assert!(validate_new_employee(&new_employee()).is_ok());

        let mut e = new_employee();
        e.last_name = "  ".into();
        assert!(validate_new_employee(&e).is_err());

        let mut e = new_employee();
        e.email = "grace".into();
        assert_eq!(validate_new_employee(&e), Err("email is invalid"));

        let mut e = new_employee();
        e.department.clear();
        assert!(validate_new_employee(&e).is_err());
    }

    #[test]
    fn inactive_employees_hidden_unless_requested() {
        let gone = stored(false);
        assert!(!matches_query(&gone, &query()));

        let q = EmployeeQuery {
            include_inactive: Some(true),
            ..query()
        };
        assert!(matches_query(&gone, &q));
    }

    #[test]
    fn search_is_case_insensitive_across_name_and_email() {
        let e = stored(true);
        for needle in ["GRACE", "hop", "company.com"] {
            let q = EmployeeQuery {
                search: Some(needle.into()),
                ..query()
            };
            assert!(matches_query(&e, &q), "{needle}");
        }
        let q = EmployeeQuery {
            search: Some("turing".into()),
            ..query()
        };
        assert!(!matches_query(&e, &q));
    }

    #[test]
    fn department_and_role_filters() {
        let e = stored(true);
        let q = EmployeeQuery {
            department: Some("engineering".into()),
            role: Some(Role::Employee),
            ..query()
        };
        assert!(matches_query(&e, &q));

        let q = EmployeeQuery {
            role: Some(Role::Manager),
            ..query()
        };
        assert!(!matches_query(&e, &q));
    }
}
