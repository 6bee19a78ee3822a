use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// The authenticated caller, placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    /// Employee id of the caller; every engine call is made on its behalf.
    pub fn employee_id(&self) -> actix_web::Result<u64> {
        self.employee_id.ok_or_else(|| {
            tracing::debug!(subject = %self.subject, "Token carries no employee id");
            actix_web::error::ErrorForbidden("No employee profile")
        })
    }
}
