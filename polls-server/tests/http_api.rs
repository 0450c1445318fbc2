//! End-to-end requests through the axum router with an in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use polls_server::models::PageLimits;
use polls_server::{build_router, AppState, MemoryStore, TokenService};

fn app() -> Router {
    let tokens = TokenService::new("http-test-secret", "polls", Duration::hours(1)).unwrap();
    let state = AppState::new(Arc::new(MemoryStore::new()), tokens, PageLimits::default());
    build_router(Arc::new(state))
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Reply {
        status,
        location,
        body,
    }
}

async fn register(app: &Router, username: &str) -> String {
    let reply = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Test User",
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(
        app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "usernameOrEmail": username, "password": "secret123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["accessToken"].as_str().unwrap().to_string()
}

async fn create_poll(app: &Router, token: &str, choices: &[&str]) -> String {
    let choices: Vec<Value> = choices.iter().map(|t| json!({ "text": t })).collect();
    let reply = send(
        app,
        "POST",
        "/api/polls",
        Some(token),
        Some(json!({
            "question": "Best way up?",
            "choices": choices,
            "pollLength": { "days": 1, "hours": 0 }
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["message"], "Poll Created Successfully");
    reply.location.unwrap()
}

#[tokio::test]
async fn health() {
    let app = app();
    let reply = send(&app, "GET", "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
}

#[tokio::test]
async fn signup_and_signin() {
    let app = app();

    let reply = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Jane Doe",
            "username": "jane",
            "email": "jane@example.com",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.location.as_deref(), Some("/api/users/jane"));
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["message"], "User registered successfully");

    let reply = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Jane Again",
            "username": "jane",
            "email": "other@example.com",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["success"], false);
    assert_eq!(reply.body["message"], "Username is already taken!");

    let reply = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "usernameOrEmail": "jane@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["tokenType"], "Bearer");
    assert!(reply.body["accessToken"].is_string());

    let reply = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "usernameOrEmail": "jane", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_validation_names_the_field() {
    let app = app();
    let reply = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Jane Doe",
            "username": "jane",
            "email": "not-an-email",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "validation_error");
    assert_eq!(reply.body["field"], "email");
}

#[tokio::test]
async fn poll_lifecycle() {
    let app = app();
    let token = register(&app, "alice").await;

    let location = create_poll(&app, &token, &["A", "B", "C"]).await;
    assert!(location.starts_with("/api/polls/"));

    let reply = send(&app, "GET", &location, None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let poll = reply.body;
    assert_eq!(poll["choices"].as_array().unwrap().len(), 3);
    assert_eq!(poll["choices"][0]["text"], "A");
    assert_eq!(poll["choices"][2]["voteCount"], 0);
    assert_eq!(poll["totalVotes"], 0);
    assert_eq!(poll["isExpired"], false);
    assert_eq!(poll["createdBy"]["username"], "alice");
    assert!(poll.get("selectedChoice").is_none());

    let choice_id = poll["choices"][1]["id"].as_i64().unwrap();
    let votes = format!("{}/votes", location);

    let reply = send(&app, "POST", &votes, Some(&token), Some(json!({ "choiceId": choice_id }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["selectedChoice"], choice_id);
    assert_eq!(reply.body["totalVotes"], 1);

    let reply = send(&app, "POST", &votes, Some(&token), Some(json!({ "choiceId": choice_id }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Sorry! You have already cast your vote in this poll");

    let reply = send(&app, "GET", &location, Some(&token), None).await;
    assert_eq!(reply.body["selectedChoice"], choice_id);
    assert_eq!(reply.body["totalVotes"], 1);
}

#[tokio::test]
async fn writes_require_a_token() {
    let app = app();
    let token = register(&app, "alice").await;
    let location = create_poll(&app, &token, &["A", "B"]).await;

    let reply = send(
        &app,
        "POST",
        "/api/polls",
        None,
        Some(json!({
            "question": "Anonymous?",
            "choices": [{ "text": "Yes" }],
            "pollLength": { "days": 0, "hours": 2 }
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "unauthorized");

    let votes = format!("{}/votes", location);
    let reply = send(&app, "POST", &votes, Some("garbage"), Some(json!({ "choiceId": 1 }))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(&app, "GET", "/api/user/me", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_reads_as_anonymous() {
    let app = app();
    let token = register(&app, "alice").await;
    create_poll(&app, &token, &["A", "B"]).await;

    let reply = send(&app, "GET", "/api/polls", Some("not.a.token"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["totalElements"], 1);
}

#[tokio::test]
async fn unknown_poll_and_choice() {
    let app = app();
    let token = register(&app, "alice").await;
    let first = create_poll(&app, &token, &["A", "B"]).await;
    let second = create_poll(&app, &token, &["C", "D"]).await;

    let reply = send(&app, "GET", "/api/polls/999", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "Poll not found with id : '999'");

    let other = send(&app, "GET", &second, None, None).await;
    let foreign_choice = other.body["choices"][0]["id"].as_i64().unwrap();

    let votes = format!("{}/votes", first);
    let reply = send(&app, "POST", &votes, Some(&token), Some(json!({ "choiceId": foreign_choice }))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn poll_creation_is_validated() {
    let app = app();
    let token = register(&app, "alice").await;

    let reply = send(
        &app,
        "POST",
        "/api/polls",
        Some(&token),
        Some(json!({
            "question": "No choices?",
            "choices": [],
            "pollLength": { "days": 1, "hours": 0 }
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["field"], "choices");

    let reply = send(
        &app,
        "POST",
        "/api/polls",
        Some(&token),
        Some(json!({
            "question": "Too long?",
            "choices": [{ "text": "Yes" }],
            "pollLength": { "days": 8, "hours": 0 }
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["field"], "pollLength.days");
}

#[tokio::test]
async fn pagination_bounds_on_every_listing() {
    let app = app();
    let token = register(&app, "alice").await;
    create_poll(&app, &token, &["A", "B"]).await;

    for base in ["/api/polls", "/api/users/alice/polls", "/api/users/alice/votes"] {
        let reply = send(&app, "GET", &format!("{}?page=-1", base), None, None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", base);
        assert_eq!(reply.body["field"], "page");

        let reply = send(&app, "GET", &format!("{}?size=51", base), None, None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", base);
        assert_eq!(reply.body["field"], "size");

        let reply = send(&app, "GET", base, None, None).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", base);
        assert_eq!(reply.body["size"], 30);
        assert_eq!(reply.body["page"], 0);
    }
}

#[tokio::test]
async fn paged_listing_shape() {
    let app = app();
    let token = register(&app, "alice").await;
    for _ in 0..3 {
        create_poll(&app, &token, &["A", "B"]).await;
    }

    let reply = send(&app, "GET", "/api/polls?page=0&size=2", None, None).await;
    assert_eq!(reply.body["content"].as_array().unwrap().len(), 2);
    assert_eq!(reply.body["totalElements"], 3);
    assert_eq!(reply.body["totalPages"], 2);
    assert_eq!(reply.body["last"], false);

    let reply = send(&app, "GET", "/api/polls?page=1&size=2", None, None).await;
    assert_eq!(reply.body["content"].as_array().unwrap().len(), 1);
    assert_eq!(reply.body["last"], true);
}

#[tokio::test]
async fn user_endpoints() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let location = create_poll(&app, &alice, &["A", "B"]).await;

    let poll = send(&app, "GET", &location, None, None).await.body;
    let choice_id = poll["choices"][0]["id"].as_i64().unwrap();
    let votes = format!("{}/votes", location);
    send(&app, "POST", &votes, Some(&bob), Some(json!({ "choiceId": choice_id }))).await;

    let reply = send(&app, "GET", "/api/user/me", Some(&bob), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "bob");

    let reply = send(&app, "GET", "/api/user/checkUsernameAvailability?username=alice", None, None).await;
    assert_eq!(reply.body["available"], false);
    let reply = send(&app, "GET", "/api/user/checkUsernameAvailability?username=carol", None, None).await;
    assert_eq!(reply.body["available"], true);
    let reply = send(&app, "GET", "/api/user/checkEmailAvailability?email=bob@example.com", None, None).await;
    assert_eq!(reply.body["available"], false);

    let reply = send(&app, "GET", "/api/users/alice", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["pollCount"], 1);
    assert_eq!(reply.body["voteCount"], 0);
    assert!(reply.body["joinedAt"].is_string());

    let reply = send(&app, "GET", "/api/users/bob/votes", Some(&bob), None).await;
    assert_eq!(reply.body["totalElements"], 1);
    assert_eq!(reply.body["content"][0]["selectedChoice"], choice_id);

    let reply = send(&app, "GET", "/api/users/alice/polls", None, None).await;
    assert_eq!(reply.body["totalElements"], 1);

    let reply = send(&app, "GET", "/api/users/nobody", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "User not found with username : 'nobody'");
}

fn assert_validation_error(reply: &Reply) {
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["success"], false);
    assert_eq!(reply.body["error"], "validation_error");
    assert!(reply.body["message"].is_string());
}

#[tokio::test]
async fn malformed_requests_get_json_400s() {
    let app = app();
    let token = register(&app, "marjorie").await;
    let location = create_poll(&app, &token, &["Ski Lift", "Elevator"]).await;

    let reply = send(&app, "POST", &format!("{}/votes", location), Some(&token), Some(json!({}))).await;
    assert_validation_error(&reply);

    let reply = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "incomplete" })),
    )
    .await;
    assert_validation_error(&reply);

    let reply = send(&app, "GET", "/api/polls?page=abc", None, None).await;
    assert_validation_error(&reply);

    let reply = send(&app, "GET", "/api/users/marjorie/votes?size=lots", None, None).await;
    assert_validation_error(&reply);

    let reply = send(&app, "GET", "/api/polls/not-a-number", None, None).await;
    assert_validation_error(&reply);
}
