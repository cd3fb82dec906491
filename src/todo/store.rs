//! Todo persistence.
//!
//! The service only talks to [`TodoStore`]; [`SqliteTodoStore`] is the
//! production implementation. Nothing here retries: a failed write is
//! reported once and the caller decides what to do.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::todo::model::{NewTodo, Todo};

/// Error raised by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence collaborator for todos.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a todo and return it with its assigned id and timestamps.
    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Look up a todo that has not been soft-deleted.
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError>;
}

/// Open a connection pool, creating the database file if needed.
///
/// In-memory URLs get a single long-lived connection so every query sees
/// the same database.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = if config.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Create the `todos` table and its index if they are absent.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            deleted_at DATETIME,
            title      TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_todos_deleted_at ON todos (deleted_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// SQLite implementation of [`TodoStore`].
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, title, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&todo.title)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, created_at, updated_at, deleted_at
            FROM todos
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }
}
