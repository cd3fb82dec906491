//! Todo Service Library
//!
//! A small REST-over-JSON service: `/ping`, token issuance at `/tokenz`, and
//! bearer-protected todo creation at `POST /todos`, persisted in SQLite.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod todo;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
