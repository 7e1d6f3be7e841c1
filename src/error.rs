use actix_web::http::StatusCode;
use thiserror::Error;

/// Failures a caller can act on. Anything else surfacing from a handler is
/// treated as an internal error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No such {0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

pub fn status_of(err: &anyhow::Error) -> StatusCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ServiceError>())
        .map_or(StatusCode::INTERNAL_SERVER_ERROR, ServiceError::status_code)
}
