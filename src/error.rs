//! Error taxonomy for the moderation core
//!
//! Every policy and validation failure maps to one variant and one HTTP
//! status. All checks fail before any write; the only swallowed failures are
//! the best-effort rate-limit bookkeeping and trending recompute, which are
//! logged at the call sites instead of surfaced here.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use sea_orm::DbErr;
use serde::Serialize;

/// Core operation failure.
#[derive(Debug)]
pub enum CoreError {
    /// Missing required field, malformed rating, oversized input.
    Validation(String),
    /// Referenced professor/course/review does not exist or is inactive.
    NotFound(&'static str),
    /// Daily or hourly submission cap exceeded.
    RateLimited(&'static str),
    /// Conflicting prior submission this semester.
    Duplicate,
    /// Insufficient role for a moderation action.
    Forbidden,
    /// Underlying store read/write failure.
    Database(DbErr),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::Validation(msg) => write!(f, "{}", msg),
            CoreError::NotFound(what) => write!(f, "{} not found", what),
            CoreError::RateLimited(msg) => write!(f, "{}", msg),
            CoreError::Duplicate => write!(
                f,
                "You already reviewed this professor for this course this semester."
            ),
            CoreError::Forbidden => write!(f, "Insufficient permissions"),
            CoreError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for CoreError {
    fn from(err: DbErr) -> Self {
        CoreError::Database(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl actix_web::ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            CoreError::Duplicate => StatusCode::CONFLICT,
            CoreError::Forbidden => StatusCode::FORBIDDEN,
            CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store failures get a generic body; the detail goes to the log only
        let message = match self {
            CoreError::Database(err) => {
                log::error!("Store failure: {:?}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}
