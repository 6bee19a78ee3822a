use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, From};
use serde_json::json;
use strum_macros::AsRefStr;

/// Broken business rules. The display text is shown to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BusinessRuleViolation {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "Please check in first")]
    NotCheckedIn,
    #[display(fmt = "Already checked out today")]
    AlreadyCheckedOut,
    #[display(
        fmt = "Maximum {} leaves allowed per month. You have reached the limit for {}.",
        limit,
        month
    )]
    MonthlyLimitExceeded { limit: usize, month: String },
    #[display(fmt = "Leave request is {}, only pending requests can be changed", from)]
    InvalidStatusTransition { from: String },
    #[display(fmt = "Not authorized to act on this leave request")]
    NotAuthorized,
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    /// A uniqueness constraint rejected the write.
    #[display(fmt = "duplicate record")]
    Duplicate,
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl StoreError {
    /// Text safe to show a caller. Driver errors stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            StoreError::Database(_) => "database error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e)
    }
}

#[derive(Debug, Display, From)]
pub enum EngineError {
    /// Input rejected before anything was written.
    #[from(ignore)]
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    BusinessRule(BusinessRuleViolation),
    #[from(ignore)]
    #[display(fmt = "{} {} not found", _0, _1)]
    NotFound(&'static str, u64),
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::Store(e.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::BusinessRule(BusinessRuleViolation::NotAuthorized) => StatusCode::FORBIDDEN,
            EngineError::BusinessRule(_) => StatusCode::CONFLICT,
            EngineError::NotFound(..) => StatusCode::NOT_FOUND,
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            EngineError::BusinessRule(rule) => json!({
                "message": self.to_string(),
                "code": rule.as_ref(),
            }),
            EngineError::Store(e) => {
                tracing::error!(error = %e, "Store failure");
                json!({ "message": e.public_message() })
            }
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rules_map_to_conflict_except_authorization() {
        let e: EngineError = BusinessRuleViolation::AlreadyCheckedIn.into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        let e: EngineError = BusinessRuleViolation::NotAuthorized.into();
        assert_eq!(e.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            EngineError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EngineError::NotFound("leave", 3).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn quota_message_names_the_month() {
        let rule = BusinessRuleViolation::MonthlyLimitExceeded {
            limit: 4,
            month: "January 2024".into(),
        };
        assert_eq!(
            rule.to_string(),
            "Maximum 4 leaves allowed per month. You have reached the limit for January 2024."
        );
        assert_eq!(rule.as_ref(), "monthly_limit_exceeded");
    }

    #[test]
    fn store_errors_pass_through() {
        let e: EngineError = StoreError::Unavailable("permission denied".into()).into();
        assert_eq!(e.to_string(), "store unavailable: permission denied");
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn body_of(e: EngineError) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(e.error_response().into_body())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn store_message_reaches_the_response_body() {
        let e: EngineError = StoreError::Unavailable("permission denied".into()).into();
        assert_eq!(
            body_of(e).await,
            json!({ "message": "store unavailable: permission denied" })
        );

        let e: EngineError = StoreError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(body_of(e).await, json!({ "message": "database error" }));
    }
}
