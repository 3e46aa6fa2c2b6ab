//! HTTP contract tests for the Corkboard API

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use chrono::Utc;
use http::header::{HeaderName, HeaderValue};
use serde_json::json;

use corkboard::Corkboard;
use corkboard::config::ConfigBuilder;
use corkboard::ratelimit::RatePolicy;
use corkboard::storage::memory::{MemoryContentStore, MemoryStore};
use corkboard::storage::models::ContentItem;
use corkboard::storage::traits::{ContentStore, RelationshipStore};

use corkboard_server::api::auth::issue_token;
use corkboard_server::api::create_router;
use corkboard_server::config::ServerConfig;
use corkboard_server::state::AppState;

const JWT_SECRET: &str = "test-secret";

struct Harness {
    server: TestServer,
    content_store: Arc<MemoryContentStore>,
}

fn harness() -> Harness {
    let config = ConfigBuilder::new()
        .with_memory_store()
        .with_op_timeout(Duration::from_secs(1))
        .with_route_policy(
            "POST /api/friends/requests",
            RatePolicy {
                window: Duration::from_secs(60),
                capacity: 3,
            },
        )
        .build()
        .unwrap();

    let relationship_store = Arc::new(MemoryStore::new());
    let content_store = Arc::new(MemoryContentStore::new());
    let engine = Corkboard::with_stores(
        config,
        Arc::clone(&relationship_store) as Arc<dyn RelationshipStore>,
        Arc::clone(&content_store) as Arc<dyn ContentStore>,
    );

    let server_config = ServerConfig {
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        feed_limit: 50,
    };

    let state = Arc::new(AppState::new(engine, server_config));
    let server = TestServer::new(create_router(state)).unwrap();

    Harness {
        server,
        content_store,
    }
}

fn bearer(user_id: &str) -> (HeaderName, HeaderValue) {
    let token = issue_token(user_id, JWT_SECRET, 1).unwrap();
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

async fn send_request(harness: &Harness, from: &str, to: &str) -> axum_test::TestResponse {
    let (name, value) = bearer(from);
    harness
        .server
        .post("/api/friends/requests")
        .add_header(name, value)
        .json(&json!({ "recipient_id": to }))
        .await
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let harness = harness();
    let response = harness.server.get("/api/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn unauthenticated_mutation_is_denied() {
    let harness = harness();
    let response = harness
        .server
        .post("/api/friends/requests")
        .json(&json!({ "recipient_id": "ben" }))
        .await;

    response.assert_status(http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn self_referential_request_is_rejected() {
    let harness = harness();
    let response = send_request(&harness, "ava", "ava").await;

    response.assert_status(http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn send_and_reverse_accept_flow() {
    let harness = harness();

    let sent = send_request(&harness, "ava", "ben").await;
    sent.assert_status_ok();
    let sent: serde_json::Value = sent.json();
    assert_eq!(sent["status"], "pending");
    let request_id = sent["request_id"].as_str().unwrap().to_string();

    let accepted = send_request(&harness, "ben", "ava").await;
    accepted.assert_status_ok();
    let accepted: serde_json::Value = accepted.json();
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["request_id"], request_id.as_str());

    for (me, other) in [("ava", "ben"), ("ben", "ava")] {
        let (name, value) = bearer(me);
        let view = harness
            .server
            .get(&format!("/api/friends/relationship/{other}"))
            .add_header(name, value)
            .await;
        view.assert_status_ok();
        let view: serde_json::Value = view.json();
        assert_eq!(view["status"], "friends");
        assert_eq!(view["friends"], true);
    }
}

#[tokio::test]
async fn decline_by_wrong_party_is_forbidden() {
    let harness = harness();

    let sent = send_request(&harness, "ava", "ben").await;
    let sent: serde_json::Value = sent.json();
    let request_id = sent["request_id"].as_str().unwrap();

    let (name, value) = bearer("ava");
    let response = harness
        .server
        .post(&format!("/api/friends/requests/{request_id}/decline"))
        .add_header(name, value)
        .await;

    response.assert_status(http::StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn delete_of_unknown_request_is_not_found() {
    let harness = harness();

    let (name, value) = bearer("ava");
    let response = harness
        .server
        .delete("/api/friends/requests/no-such-id")
        .add_header(name, value)
        .await;

    response.assert_status(http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn incoming_requests_and_seen_flow() {
    let harness = harness();

    send_request(&harness, "ben", "ava").await.assert_status_ok();

    let (name, value) = bearer("ava");
    let incoming = harness
        .server
        .get("/api/friends/requests/incoming")
        .add_header(name.clone(), value.clone())
        .await;
    incoming.assert_status_ok();
    let incoming: serde_json::Value = incoming.json();
    assert_eq!(incoming.as_array().unwrap().len(), 1);
    assert_eq!(incoming[0]["requester_id"], "ben");
    let request_id = incoming[0]["id"].as_str().unwrap().to_string();

    let seen = harness
        .server
        .post(&format!("/api/friends/requests/{request_id}/seen"))
        .add_header(name.clone(), value.clone())
        .await;
    seen.assert_status(http::StatusCode::NO_CONTENT);

    let incoming = harness
        .server
        .get("/api/friends/requests/incoming")
        .add_header(name, value)
        .await;
    let incoming: serde_json::Value = incoming.json();
    assert!(incoming[0]["seen_at"].is_string());
}

#[tokio::test]
async fn unfriend_clears_the_relationship() {
    let harness = harness();

    send_request(&harness, "ava", "ben").await.assert_status_ok();
    let accepted = send_request(&harness, "ben", "ava").await;
    let accepted: serde_json::Value = accepted.json();
    let request_id = accepted["request_id"].as_str().unwrap();

    let (name, value) = bearer("ava");
    let deleted = harness
        .server
        .delete(&format!("/api/friends/requests/{request_id}"))
        .add_header(name.clone(), value.clone())
        .await;
    deleted.assert_status_ok();
    let deleted: serde_json::Value = deleted.json();
    assert_eq!(deleted["status"], "deleted");

    let view = harness
        .server
        .get("/api/friends/relationship/ben")
        .add_header(name, value)
        .await;
    let view: serde_json::Value = view.json();
    assert_eq!(view["status"], "none");
}

#[tokio::test]
async fn governed_mutations_carry_rate_headers_and_deny_past_capacity() {
    let harness = harness();

    // Capacity is 3 for the send route; use distinct recipients so every
    // call is a real mutation
    for (i, other) in ["ben", "cara", "dana"].into_iter().enumerate() {
        let response = send_request(&harness, "ava", other).await;
        response.assert_status_ok();
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert_eq!(remaining, (2 - i).to_string());
        assert!(response.headers().get("x-ratelimit-limit").is_some());
        assert!(response.headers().get("x-ratelimit-reset").is_some());
    }

    let denied = send_request(&harness, "ava", "elle").await;
    denied.assert_status(http::StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = denied
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // Another subject is unaffected
    send_request(&harness, "ben", "ava").await.assert_status_ok();
}

#[tokio::test]
async fn feed_is_filtered_through_batch_visibility() {
    let harness = harness();

    send_request(&harness, "ava", "ben").await.assert_status_ok();
    send_request(&harness, "ben", "ava").await.assert_status_ok();

    for (owner, tier, age) in [
        ("ben", Some("friends"), 3),
        ("stranger", Some("private"), 2),
        ("stranger", Some("public"), 1),
    ] {
        harness
            .content_store
            .add(ContentItem {
                id: format!("{owner}-{age}"),
                owner_id: owner.to_string(),
                privacy_tier: tier.map(|t| t.to_string()),
                created_at: Utc::now() - chrono::Duration::seconds(age),
            })
            .await;
    }

    let (name, value) = bearer("ava");
    let feed = harness.server.get("/api/feed").add_header(name, value).await;
    feed.assert_status_ok();
    let feed: serde_json::Value = feed.json();
    let items = feed.as_array().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["owner_id"], "stranger");
    assert_eq!(items[0]["privacy_tier"], "public");
    assert_eq!(items[1]["owner_id"], "ben");
}
