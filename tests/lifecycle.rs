//! End-to-end serve and shutdown tests over real sockets.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpStream;

use todo_service::lifecycle::startup::build_state;
use todo_service::lifecycle::{LifecycleState, ShutdownOutcome};

mod common;

use common::{RunningServer, SlowStore};

async fn slow_server(delay: Duration, grace_secs: u64) -> RunningServer {
    let mut config = common::test_config();
    config.shutdown.grace_period_secs = grace_secs;
    config.timeouts.write_secs = 30;

    let store = SlowStore::new(common::memory_pool().await, delay);
    let state = build_state(&config.auth, Arc::new(store));
    common::spawn_server(config, state).await
}

fn post_todo(server: &RunningServer) -> tokio::task::JoinHandle<reqwest::Result<reqwest::Response>> {
    let request = common::client()
        .post(server.url("/todos"))
        .header("authorization", common::bearer())
        .body(r#"{"text":"in flight"}"#);
    tokio::spawn(request.send())
}

#[tokio::test]
async fn serves_requests_over_tcp() {
    let config = common::test_config();
    let (state, _pool) = common::memory_state(&config).await;
    let server = common::spawn_server(config, state).await;
    let client = common::client();

    let pong: Value = client
        .get(server.url("/ping"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pong["message"], "pong");

    let token: Value = client
        .get(server.url("/tokenz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let created = client
        .post(server.url("/todos"))
        .bearer_auth(token["token"].as_str().unwrap())
        .body(r#"{"text":"over the wire"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(created.json::<Value>().await.unwrap()["ID"], 1);

    server.shutdown.trigger();
    assert_eq!(server.handle.await.unwrap(), ShutdownOutcome::Graceful);
}

#[tokio::test]
async fn idle_server_stops_gracefully_and_refuses_new_connections() {
    let config = common::test_config();
    let (state, _pool) = common::memory_state(&config).await;
    let server = common::spawn_server(config, state).await;
    let addr = server.addr;

    server.shutdown.trigger();
    let outcome = server.handle.await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::Graceful);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(*server.state.borrow(), LifecycleState::Exited);
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn in_flight_request_completes_during_drain() {
    let server = slow_server(Duration::from_millis(800), 5).await;
    let mut state = server.state.clone();

    let in_flight = post_todo(&server);
    tokio::time::sleep(Duration::from_millis(200)).await;
    server.shutdown.trigger();

    state
        .wait_for(|s| *s == LifecycleState::ShuttingDown)
        .await
        .unwrap();

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>().await.unwrap()["ID"], 1);

    assert_eq!(server.handle.await.unwrap(), ShutdownOutcome::Graceful);
    assert_eq!(*state.borrow(), LifecycleState::Exited);
}

#[tokio::test]
async fn drain_is_bounded_by_grace_period() {
    let server = slow_server(Duration::from_secs(3), 1).await;

    let _in_flight = post_todo(&server);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = tokio::time::Instant::now();
    server.shutdown.trigger();
    let outcome = server.handle.await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::DeadlineElapsed);
    assert_eq!(outcome.exit_code(), 1);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn second_trigger_forces_exit() {
    let server = slow_server(Duration::from_secs(3), 10).await;

    let _in_flight = post_todo(&server);
    tokio::time::sleep(Duration::from_millis(200)).await;

    server.shutdown.trigger();
    let mut state = server.state.clone();
    state
        .wait_for(|s| *s == LifecycleState::ShuttingDown)
        .await
        .unwrap();
    server.shutdown.trigger();

    let outcome = tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, ShutdownOutcome::Forced);
    assert_eq!(outcome.exit_code(), 130);
}

#[tokio::test]
async fn slow_request_times_out() {
    let mut config = common::test_config();
    config.timeouts.write_secs = 1;
    let store = SlowStore::new(common::memory_pool().await, Duration::from_secs(3));
    let state = build_state(&config.auth, Arc::new(store));
    let server = common::spawn_server(config, state).await;

    let response = post_todo(&server).await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    server.shutdown.trigger();
    server.handle.await.unwrap();
}
