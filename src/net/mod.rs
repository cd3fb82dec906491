//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → connection.rs (lifecycle tracking)
//!     → Hand off to the HTTP layer (one task per connection)
//! ```
//!
//! # Design Decisions
//! - No admission control: every accepted connection gets its own task
//! - Each connection is tracked so shutdown can report what is still open

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
