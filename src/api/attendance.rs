use crate::api::{current_employee, now, visible_targets};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::attendance::{AttendanceEngine, summarize};
use crate::model::attendance::{AttendanceRecord, AttendanceSummary, MissingDay};
use crate::store::mysql::MySqlStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Restrict to one employee (must be visible to the caller)
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    /// First day, inclusive. Defaults to the start of the missing-day window
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Last day, inclusive. Defaults to today
    #[schema(example = "2026-01-31", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub records: Vec<AttendanceRecord>,
    /// Weekdays without any record; reporting only, never stored
    pub missing: Vec<MissingDay>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceRecord),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today",
            "code": "already_checked_in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let record = AttendanceEngine::new(store.get_ref(), &config.work)
        .check_in(employee_id, now())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked out; hours and status computed", body = AttendanceRecord),
        (status = 409, description = "No open check-in, or already checked out", body = Object, example = json!({
            "message": "Please check in first",
            "code": "not_checked_in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let record = AttendanceEngine::new(store.get_ref(), &config.work)
        .check_out(employee_id, now())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Attendance records plus synthesized missing days
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records and missing days, newest first", body = AttendanceListResponse),
        (status = 400, description = "from is after to"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee not visible to caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let viewer = current_employee(&store, &auth).await?;
    let targets = visible_targets(&store, &viewer, query.employee_id).await?;

    let today = now().date();
    let from = query
        .from
        .unwrap_or(today - Duration::days(i64::from(config.missing.lookback_days)));
    let to = query.to.unwrap_or(today);

    let engine = AttendanceEngine::new(store.get_ref(), &config.work);
    let records = engine.records(&targets, from, to).await?;
    let missing = engine.missing(&targets, today, &config.missing).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse { records, missing }))
}

/// Counts by status with total and average hours
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance summary", body = AttendanceSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee not visible to caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let viewer = current_employee(&store, &auth).await?;
    let targets = visible_targets(&store, &viewer, query.employee_id).await?;

    let today = now().date();
    let from = query
        .from
        .unwrap_or(today - Duration::days(i64::from(config.missing.lookback_days)));
    let to = query.to.unwrap_or(today);

    let records = AttendanceEngine::new(store.get_ref(), &config.work)
        .records(&targets, from, to)
        .await?;

    Ok(HttpResponse::Ok().json(summarize(&records)))
}
