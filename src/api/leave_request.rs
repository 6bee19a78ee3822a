use crate::api::{current_employee, now};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::approval::{can_view_leave, visible_leaves};
use crate::engine::leave::{LeaveEngine, ReviewOutcome, leave_stats};
use crate::error::{BusinessRuleViolation, EngineError};
use crate::model::leave_request::{
    Decision, LeaveApplication, LeaveBalance, LeaveRequest, LeaveStats, LeaveStatus,
};
use crate::store::Store;
use crate::store::mysql::MySqlStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::Datelike;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[schema(example = "pending")]
    #[param(value_type = Option<String>)]
    pub status: Option<LeaveStatus>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    /// Calendar year, defaults to the current one
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct ReviewBody {
    #[schema(example = "Enjoy the break")]
    pub comments: Option<String>,
}

fn leave_engine<'a>(
    store: &'a MySqlStore,
    config: &'a Config,
) -> LeaveEngine<'a, MySqlStore, MySqlStore> {
    LeaveEngine::new(store, store, &config.allotment)
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveApplication,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted, pending review", body = LeaveRequest),
        (status = 400, description = "Invalid dates or missing reason"),
        (status = 409, description = "Monthly leave limit reached", body = Object, example = json!({
            "message": "Maximum 4 leaves allowed per month. You have reached the limit for January 2026.",
            "code": "monthly_limit_exceeded"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    payload: web::Json<LeaveApplication>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let leave = leave_engine(&store, &config)
        .apply_leave(employee_id, payload.into_inner(), now())
        .await?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Own leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    filter: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let mut leaves = store
        .leaves_for_employee(employee_id)
        .await
        .map_err(EngineError::from)?;
    if let Some(status) = filter.status {
        leaves.retain(|l| l.status == status);
    }
    leaves.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));

    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 403, description = "Not visible to caller"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let viewer = current_employee(&store, &auth).await?;

    let leave = store
        .get_leave(leave_id)
        .await
        .map_err(EngineError::from)?
        .ok_or(EngineError::NotFound("leave request", leave_id))?;

    if !can_view_leave(&viewer, &leave) {
        return Err(EngineError::from(BusinessRuleViolation::NotAuthorized).into());
    }

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Review
========================= */
async fn review(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    leave_id: u64,
    decision: Decision,
    body: Option<web::Json<ReviewBody>>,
) -> actix_web::Result<HttpResponse> {
    let reviewer_id = auth.employee_id()?;
    let comments = body.map(|b| b.into_inner()).unwrap_or_default().comments;

    let outcome = leave_engine(&store, &config)
        .review_leave(reviewer_id, leave_id, decision, comments, now())
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    request_body(content = ReviewBody, description = "Optional reviewer comments", content_type = "application/json"),
    responses(
        (status = 200, description = "Approved; includes the applicant's balance", body = ReviewOutcome),
        (status = 403, description = "Caller may not review this request"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewBody>>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, config, path.into_inner(), Decision::Approve, body).await
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    request_body(content = ReviewBody, description = "Optional reviewer comments", content_type = "application/json"),
    responses(
        (status = 200, description = "Rejected; includes the applicant's balance", body = ReviewOutcome),
        (status = 403, description = "Caller may not review this request"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewBody>>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, config, path.into_inner(), Decision::Reject, body).await
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/cancel",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Cancelled", body = LeaveRequest),
        (status = 403, description = "Only the applicant may cancel"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let leave = leave_engine(&store, &config)
        .cancel_leave(employee_id, path.into_inner(), now())
        .await?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Balance, queue and stats
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Remaining days per tracked leave type", body = LeaveBalance),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let year = query.year.unwrap_or_else(|| now().year());

    let balance = leave_engine(&store, &config)
        .balance(employee_id, year)
        .await?;

    Ok(HttpResponse::Ok().json(balance))
}

#[utoipa::path(
    get,
    path = "/api/leave/approvable",
    responses(
        (status = 200, description = "Pending requests the caller may review", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approvable_leaves(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let reviewer_id = auth.employee_id()?;

    let leaves = leave_engine(&store, &config)
        .approvable_requests(reviewer_id)
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leave/stats",
    responses(
        (status = 200, description = "Counts by status and type over visible requests", body = LeaveStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_statistics(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    let viewer = current_employee(&store, &auth).await?;
    let everyone = store.list_employees().await.map_err(EngineError::from)?;

    // Requests follow the reporting head stored at submission, not the current team
    let mut leaves = Vec::new();
    for employee in everyone {
        leaves.extend(
            store
                .leaves_for_employee(employee.id)
                .await
                .map_err(EngineError::from)?,
        );
    }
    let leaves = visible_leaves(&viewer, leaves);

    Ok(HttpResponse::Ok().json(leave_stats(&leaves)))
}
