//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides: PORT, SIGN, VERIFY_SECRET, DATABASE_URL, LOG_LEVEL
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! `.env` is loaded into the process environment by `main` before any of
//! this runs.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, DatabaseConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServiceConfig, ShutdownConfig, TimeoutConfig,
};
