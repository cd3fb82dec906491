//! Authenticated todo creation.

use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::error::ServiceError;
use crate::observability::metrics;
use crate::todo::model::{CreateTodoRequest, CreatedTodo, NewTodo};
use crate::todo::store::TodoStore;

/// Strip a literal `"Bearer "` prefix. Anything else is passed through
/// unchanged and left for the validator to reject.
pub fn bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header)
}

/// Proof that the caller's bearer token passed validation.
#[derive(Debug)]
pub struct Authorized(());

/// Creates todos on behalf of callers holding a valid bearer token.
pub struct TodoService {
    validator: TokenValidator,
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(validator: TokenValidator, store: Arc<dyn TodoStore>) -> Self {
        Self { validator, store }
    }

    /// Check the `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Authorized, ServiceError> {
        let token = bearer_token(authorization.unwrap_or_default());
        match self.validator.validate(token) {
            Ok(()) => Ok(Authorized(())),
            Err(e) => {
                metrics::record_auth_failure(e.kind());
                Err(e.into())
            }
        }
    }

    /// Parse and persist a body from an authorized caller.
    pub async fn create(
        &self,
        _authorized: Authorized,
        raw_body: &[u8],
    ) -> Result<CreatedTodo, ServiceError> {
        let request = CreateTodoRequest::from_slice(raw_body)?;

        let todo = self
            .store
            .create(NewTodo {
                title: request.text,
            })
            .await?;

        tracing::info!(todo_id = todo.id, "Todo created");
        metrics::record_todo_created();

        Ok(CreatedTodo { id: todo.id })
    }

    /// Authorize, parse and persist. The token is checked before the body
    /// is looked at.
    pub async fn create_todo(
        &self,
        raw_body: &[u8],
        authorization: Option<&str>,
    ) -> Result<CreatedTodo, ServiceError> {
        let authorized = self.authorize(authorization)?;
        self.create(authorized, raw_body).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    use super::*;
    use crate::config::DatabaseConfig;
    use crate::todo::model::Todo;
    use crate::todo::store::{self, SqliteTodoStore, StoreError};

    const SECRET: &str = "test-secret";

    struct FailingStore;

    #[async_trait]
    impl TodoStore for FailingStore {
        async fn create(&self, _todo: NewTodo) -> Result<Todo, StoreError> {
            Err(sqlx::Error::PoolClosed.into())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Todo>, StoreError> {
            Err(sqlx::Error::PoolClosed.into())
        }
    }

    fn token(alg: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(alg),
            &serde_json::json!({}),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn bearer() -> String {
        format!("Bearer {}", token(Algorithm::HS256, SECRET))
    }

    async fn service() -> (TodoService, Arc<dyn TodoStore>) {
        let pool = store::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        store::migrate(&pool).await.unwrap();
        let store: Arc<dyn TodoStore> = Arc::new(SqliteTodoStore::new(pool));
        (TodoService::new(TokenValidator::new(SECRET), store.clone()), store)
    }

    #[test]
    fn bearer_prefix_is_case_sensitive_and_optional() {
        assert_eq!(bearer_token("Bearer abc"), "abc");
        assert_eq!(bearer_token("abc"), "abc");
        assert_eq!(bearer_token("bearer abc"), "bearer abc");
        assert_eq!(bearer_token("Bearer "), "");
        assert_eq!(bearer_token(""), "");
    }

    #[tokio::test]
    async fn creates_and_stores_title() {
        let (service, store) = service().await;
        let auth = bearer();

        let first = service
            .create_todo(br#"{"text":"buy milk"}"#, Some(auth.as_str()))
            .await
            .unwrap();
        let second = service
            .create_todo(br#"{"text":"buy milk"}"#, Some(auth.as_str()))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let stored = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.title, "buy milk");
    }

    #[tokio::test]
    async fn empty_title_is_accepted() {
        let (service, store) = service().await;
        let auth = bearer();

        let bodies: [&[u8]; 4] = [br#"{"text":""}"#, br#"{"text":null}"#, b"{}", b"null"];
        for body in bodies {
            let created = service.create_todo(body, Some(auth.as_str())).await.unwrap();
            let stored = store.find_by_id(created.id).await.unwrap().unwrap();
            assert_eq!(stored.title, "");
        }
    }

    #[tokio::test]
    async fn raw_token_without_prefix_still_validates() {
        let (service, _store) = service().await;
        let raw = token(Algorithm::HS512, SECRET);
        assert!(service.create_todo(br#"{"text":"x"}"#, Some(raw.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn auth_is_checked_before_body() {
        let (service, _store) = service().await;

        let err = service.create_todo(b"{not json", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));

        let wrong = format!("Bearer {}", token(Algorithm::HS256, "other"));
        let err = service
            .create_todo(b"{not json", Some(wrong.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
        assert!(err.public_detail().is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_validation_error() {
        let (service, store) = service().await;
        let auth = bearer();

        let bodies: [&[u8]; 5] = [
            b"{\"text\": invalid}",
            b"",
            b"{\"text\": 5}",
            b"[\"buy milk\"]",
            b"[]",
        ];
        for body in bodies {
            let err = service.create_todo(body, Some(auth.as_str())).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
            assert!(!err.public_detail().unwrap().is_empty());
        }
        assert!(store.find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authorize_then_create() {
        let (service, _store) = service().await;

        assert!(service.authorize(None).is_err());
        let authorized = service.authorize(Some(bearer().as_str())).unwrap();
        let created = service.create(authorized, br#"{"text":"x"}"#).await.unwrap();
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn store_failure_is_persistence_error() {
        let service = TodoService::new(TokenValidator::new(SECRET), Arc::new(FailingStore));

        let err = service
            .create_todo(br#"{"text":"x"}"#, Some(bearer().as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
