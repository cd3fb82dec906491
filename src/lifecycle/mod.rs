//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Connect database → Migrate → Build state → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger (first: drain, second: force)
//!
//! Shutdown (shutdown.rs, driven by http::server):
//!     Trigger → Stop accepting → Drain connections (bounded) → Exit
//!
//! State (state.rs):
//!     Starting → Serving → ShuttingDown → Exited
//! ```
//!
//! # Design Decisions
//! - Ordered startup: database first, listener last (traffic only when ready)
//! - Shutdown has a deadline; running out of time is reported, not hidden
//! - A second termination signal abandons the drain

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownOutcome, ShutdownSignal};
pub use state::{Lifecycle, LifecycleState};
