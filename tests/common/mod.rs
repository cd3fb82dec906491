//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use todo_service::config::{AuthConfig, DatabaseConfig, ServiceConfig};
use todo_service::http::AppState;
use todo_service::lifecycle::startup::build_state;
use todo_service::lifecycle::{LifecycleState, Shutdown, ShutdownOutcome};
use todo_service::net::Listener;
use todo_service::todo::store::{self, SqliteTodoStore, StoreError};
use todo_service::todo::{NewTodo, Todo, TodoStore};
use todo_service::HttpServer;

pub const SECRET: &str = "integration-secret";

/// Configuration with a shared secret and an in-memory database.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    config.auth = AuthConfig {
        signing_secret: SECRET.to_string(),
        verification_secret: SECRET.to_string(),
        token_ttl_secs: 300,
    };
    config
}

pub async fn memory_pool() -> SqlitePool {
    let pool = store::connect(&test_config().database).await.unwrap();
    store::migrate(&pool).await.unwrap();
    pool
}

/// Handler state over a fresh in-memory database.
pub async fn memory_state(config: &ServiceConfig) -> (AppState, SqlitePool) {
    let pool = memory_pool().await;
    let state = build_state(&config.auth, Arc::new(SqliteTodoStore::new(pool.clone())));
    (state, pool)
}

/// Sign an empty claim set.
pub fn token(alg: Algorithm, secret: &str) -> String {
    encode(
        &Header::new(alg),
        &serde_json::json!({}),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", token(Algorithm::HS256, SECRET))
}

/// Store that holds every write for a fixed delay before delegating.
pub struct SlowStore {
    inner: SqliteTodoStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(pool: SqlitePool, delay: Duration) -> Self {
        Self {
            inner: SqliteTodoStore::new(pool),
            delay,
        }
    }
}

#[async_trait]
impl TodoStore for SlowStore {
    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.create(todo).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        self.inner.find_by_id(id).await
    }
}

/// A server running on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<LifecycleState>,
    pub handle: JoinHandle<ShutdownOutcome>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server for `state` and wait until it is serving.
pub async fn spawn_server(config: ServiceConfig, state: AppState) -> RunningServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener = Listener::from_tcp(tcp).unwrap();
    let addr = listener.local_addr();

    let server = HttpServer::new(config, state);
    let mut lifecycle = server.lifecycle();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, signal));

    lifecycle
        .wait_for(|s| *s == LifecycleState::Serving)
        .await
        .unwrap();

    RunningServer {
        addr,
        shutdown,
        state: lifecycle,
        handle,
    }
}

/// Client that opens a fresh connection per request.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
