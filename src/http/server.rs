//! HTTP server setup and serve loop.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve HTTP/1.1 connections with read timeout and header size limits
//! - Stop accepting on shutdown and drain open connections within a deadline

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    server::graceful::GracefulShutdown,
};
use tokio::sync::watch;
use tower::ServiceExt;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{make_span, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::{Lifecycle, LifecycleState, ShutdownOutcome, ShutdownSignal};
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::todo::TodoService;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
    pub issuer: Arc<TokenIssuer>,
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/tokenz", get(handlers::issue_token))
        .route("/todos", post(handlers::create_todo))
        .route_layer(middleware::from_fn(metrics::track_requests))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeouts.write(),
        ))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
}

/// HTTP server for the todo service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    lifecycle: Lifecycle,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, state: AppState) -> Self {
        let router = build_router(&config, state);
        Self {
            router,
            config,
            lifecycle: Lifecycle::new(),
            connections: ConnectionTracker::new(),
        }
    }

    /// Observe lifecycle transitions.
    pub fn lifecycle(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Handle on the open-connection counter.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn connection_builder(&self) -> http1::Builder {
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.timeouts.read())
            .max_buf_size(self.config.limits.max_header_bytes);
        builder
    }

    /// Serve until `shutdown` fires, then drain.
    ///
    /// The first trigger closes the listener and asks every connection to
    /// finish its current request. The drain ends when all connections are
    /// closed, when the grace period runs out, or when a second trigger
    /// arrives, whichever comes first.
    pub async fn run(self, listener: Listener, mut shutdown: ShutdownSignal) -> ShutdownOutcome {
        let http = self.connection_builder();
        let graceful = GracefulShutdown::new();
        let grace_period = self.config.shutdown.grace_period();

        self.lifecycle.advance(LifecycleState::Serving);
        tracing::info!(address = %listener.local_addr(), "HTTP server serving");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                            continue;
                        }
                    };

                    let guard = self.connections.track(peer);
                    let router = self.router.clone();
                    let service = service_fn(move |request: Request<Incoming>| {
                        router.clone().oneshot(request)
                    });
                    let conn = graceful.watch(http.serve_connection(TokioIo::new(stream), service));

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(
                                connection_id = %guard.id(),
                                peer_addr = %guard.peer(),
                                error = %e,
                                "Connection ended with error"
                            );
                        }
                        drop(guard);
                    });
                }
                _ = shutdown.recv() => break,
            }
        }

        drop(listener);
        self.lifecycle.advance(LifecycleState::ShuttingDown);
        tracing::info!(
            open_connections = self.connections.active_count(),
            grace_period_secs = grace_period.as_secs(),
            "Stopped accepting connections, draining"
        );

        let outcome = tokio::select! {
            _ = graceful.shutdown() => ShutdownOutcome::Graceful,
            _ = tokio::time::sleep(grace_period) => ShutdownOutcome::DeadlineElapsed,
            _ = shutdown.recv_forced() => ShutdownOutcome::Forced,
        };

        match outcome {
            ShutdownOutcome::Graceful => tracing::info!("All connections drained"),
            ShutdownOutcome::DeadlineElapsed => tracing::error!(
                open_connections = self.connections.active_count(),
                "Grace period elapsed before connections drained"
            ),
            ShutdownOutcome::Forced => tracing::warn!(
                open_connections = self.connections.active_count(),
                "Drain abandoned by second shutdown signal"
            ),
        }

        self.lifecycle.advance(LifecycleState::Exited);
        tracing::info!("HTTP server stopped");
        outcome
    }
}
