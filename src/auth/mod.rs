//! Bearer token handling.
//!
//! # Data Flow
//! ```text
//! GET /tokenz  → issuer.rs   (HS256, signing secret, `exp` only)
//! POST /todos  → validator.rs (HMAC allow-list, verification secret)
//! ```
//!
//! The two sides are keyed by separately configured secrets; see
//! `AuthConfig`.

pub mod issuer;
pub mod validator;

use jsonwebtoken::Algorithm;
use thiserror::Error;

pub use issuer::{IssuedToken, TokenIssuer};
pub use validator::TokenValidator;

/// Why a token was refused or could not be produced.
///
/// Variants exist for logs. Callers answer every one of them the same way.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("signing algorithm {0:?} is not in the HMAC family")]
    DisallowedAlgorithm(Algorithm),

    #[error("token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Malformed(_) => "malformed",
            AuthError::DisallowedAlgorithm(_) => "algorithm",
            AuthError::Rejected(_) => "rejected",
            AuthError::Signing(_) => "signing",
        }
    }
}
