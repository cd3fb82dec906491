//! Todo records.
//!
//! # Data Flow
//! ```text
//! POST /todos
//!     → service.rs (bearer gate → JSON body → persist)
//!     → store.rs   (TodoStore trait, SQLite implementation)
//! ```

pub mod model;
pub mod service;
pub mod store;

pub use model::{CreateTodoRequest, CreatedTodo, NewTodo, Todo};
pub use service::{Authorized, TodoService};
pub use store::{SqliteTodoStore, StoreError, TodoStore};
