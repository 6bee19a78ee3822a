use crate::{
    api::{attendance, employee, leave_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Arc<Limiter>) {
    // Everything below the prefix needs a bearer token
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiter) // rate limiting
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/team
                    .service(web::resource("/team").route(web::get().to(employee::team)))
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // static segments before /{id}
                    .service(
                        web::resource("/balance").route(web::get().to(leave_request::leave_balance)),
                    )
                    .service(
                        web::resource("/approvable")
                            .route(web::get().to(leave_request::approvable_leaves)),
                    )
                    .service(
                        web::resource("/stats").route(web::get().to(leave_request::leave_statistics)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::put().to(attendance::check_out))
                            .route(web::post().to(attendance::check_in))
                            .route(web::get().to(attendance::attendance_list)),
                    )
                    // /attendance/summary
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::attendance_summary)),
                    ),
            ),
    );
}
