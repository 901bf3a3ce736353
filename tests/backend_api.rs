// SPDX-License-Identifier: MIT
// REST collaborator round trips against a local mock server.

use alloy::primitives::Address;
use httpmock::prelude::*;
use raid_sync::domain::error::AppError;
use raid_sync::network::backend::{BackendClient, RemoteIntent, TargetingRemote};
use std::time::Duration;

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(server.base_url(), Duration::from_secs(2))
}

fn intent() -> RemoteIntent {
    RemoteIntent {
        target: Address::repeat_byte(0x11),
        attacker: Address::repeat_byte(0x22),
        kind: "strike".into(),
        phase: "selecting".into(),
        created_at_ms: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn broadcast_posts_the_intent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/targeting/register")
                .json_body_obj(&intent());
            then.status(204);
        })
        .await;

    let client = client_for(&server);
    client.broadcast(&intent()).await.expect("broadcast ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn broadcast_maps_http_failure_to_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/targeting/register");
            then.status(503);
        })
        .await;

    let client = client_for(&server);
    let err = client.broadcast(&intent()).await.expect_err("503 surfaces");
    assert!(matches!(err, AppError::Api { status: 503, .. }));
}

#[tokio::test]
async fn snapshot_parses_the_active_list() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/targeting/active");
            then.status(200).json_body_obj(&vec![intent()]);
        })
        .await;

    let client = client_for(&server);
    let snapshot = client.snapshot().await.expect("snapshot ok");
    assert_eq!(snapshot, vec![intent()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn snapshot_retries_once_before_giving_up() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/targeting/active");
            then.status(500);
        })
        .await;

    let client = client_for(&server);
    let err = client.snapshot().await.expect_err("persistent 500 fails");
    assert!(matches!(err, AppError::Api { status: 500, .. }));
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn watchlist_returns_opaque_addresses() {
    let server = MockServer::start_async().await;
    let addresses = vec![Address::repeat_byte(0x0a), Address::repeat_byte(0x0b)];
    server
        .mock_async(|when, then| {
            when.method(GET).path("/watchlist/leaderboard");
            then.status(200).json_body_obj(&addresses);
        })
        .await;

    let client = client_for(&server);
    let fetched = client.watchlist("leaderboard").await.expect("watchlist ok");
    assert_eq!(fetched, addresses);
}
