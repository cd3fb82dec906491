//! Startup orchestration.
//!
//! # Responsibilities
//! - Open and migrate the database
//! - Build the token validator, issuer and todo service
//! - Bind the listener last, so traffic only arrives when ready
//!
//! Any failure here is fatal to the process.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{TokenIssuer, TokenValidator};
use crate::config::{AuthConfig, ServiceConfig};
use crate::http::{AppState, HttpServer};
use crate::net::{Listener, ListenerError};
use crate::todo::store::{self, SqliteTodoStore};
use crate::todo::{StoreError, TodoService, TodoStore};

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database unavailable: {0}")]
    Database(#[source] StoreError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Wire handler state around a store.
pub fn build_state(auth: &AuthConfig, store: Arc<dyn TodoStore>) -> AppState {
    let validator = TokenValidator::new(&auth.verification_secret);
    let issuer = TokenIssuer::new(&auth.signing_secret, Duration::from_secs(auth.token_ttl_secs));

    AppState {
        todos: Arc::new(TodoService::new(validator, store)),
        issuer: Arc::new(issuer),
    }
}

/// Bring the service up to the point where it is ready to serve.
pub async fn start(config: ServiceConfig) -> Result<(HttpServer, Listener), StartupError> {
    warn_on_secret_setup(&config.auth);

    let pool = store::connect(&config.database)
        .await
        .map_err(StartupError::Database)?;
    store::migrate(&pool).await.map_err(StartupError::Database)?;
    tracing::info!(url = %config.database.url, "Database ready");

    let state = build_state(&config.auth, Arc::new(SqliteTodoStore::new(pool)));
    let listener = Listener::bind(&config.listener).await?;
    let server = HttpServer::new(config, state);

    Ok((server, listener))
}

fn warn_on_secret_setup(auth: &AuthConfig) {
    if auth.signing_secret.is_empty() {
        tracing::warn!("SIGN is not set; /tokenz signs with an empty secret");
    }
    if !auth.secrets_match() {
        tracing::warn!(
            "Signing and verification secrets differ; tokens from /tokenz will not pass verification"
        );
    }
}
