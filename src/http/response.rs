//! Error-to-response mapping.
//!
//! | error        | status  | body                  |
//! |--------------|---------|-----------------------|
//! | Auth         | 401     | empty                 |
//! | Body         | 413/400 | `{"error": <reader>}` |
//! | Validation   | 400     | `{"error": <parser>}` |
//! | Persistence  | 500     | `{"error": <store>}`  |
//!
//! Token failures are never explained to the caller. Parser and store
//! messages are.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Auth(e) => tracing::debug!(reason = %e, "Rejected bearer token"),
            ServiceError::Body(e) => tracing::debug!(error = %e, "Unreadable request body"),
            ServiceError::Validation(e) => tracing::debug!(error = %e, "Malformed request body"),
            ServiceError::Persistence(e) => tracing::error!(error = %e, "Failed to persist todo"),
        }

        let status = self.status();
        match self.public_detail() {
            Some(error) => (status, Json(ErrorBody { error })).into_response(),
            None => status.into_response(),
        }
    }
}
