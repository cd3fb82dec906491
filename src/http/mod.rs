//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper HTTP/1.1 connection, Axum router, graceful drain)
//!     → request.rs (request ID, tracing span)
//!     → handlers.rs (/ping, /tokenz, /todos)
//!     → response.rs (ServiceError → status + body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{build_router, AppState, HttpServer};
