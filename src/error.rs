//! Request-level error taxonomy.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::auth::AuthError;
use crate::todo::StoreError;

/// Terminal failure of a single request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad, missing or wrongly signed token.
    #[error("unauthorized: {0}")]
    Auth(#[from] AuthError),

    /// Request body could not be read, e.g. it exceeds the size limit.
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    /// Request body is not the expected JSON.
    #[error("{0}")]
    Validation(#[from] serde_json::Error),

    /// The store could not complete the write.
    #[error("{0}")]
    Persistence(#[from] StoreError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Body(e) => e.status(),
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message echoed to the caller, if any.
    ///
    /// Auth failures stay opaque. Body, parser and store messages are
    /// returned as-is.
    pub fn public_detail(&self) -> Option<String> {
        match self {
            ServiceError::Auth(_) => None,
            ServiceError::Body(_) | ServiceError::Validation(_) | ServiceError::Persistence(_) => {
                Some(self.to_string())
            }
        }
    }
}
