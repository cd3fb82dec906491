//! Route handlers.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::auth::IssuedToken;
use crate::error::ServiceError;
use crate::http::server::AppState;
use crate::todo::CreatedTodo;

/// `GET /ping`
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// `GET /tokenz`
pub async fn issue_token(State(state): State<AppState>) -> Result<Json<IssuedToken>, StatusCode> {
    state.issuer.issue().map(Json).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue token");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// `POST /todos`
///
/// The token is checked before the body is read, so unauthenticated
/// callers get 401 whatever they send. Content type is not enforced.
pub async fn create_todo(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<CreatedTodo>), ServiceError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let authorized = state.todos.authorize(authorization)?;

    let body = Bytes::from_request(request, &state).await?;
    let created = state.todos.create(authorized, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
