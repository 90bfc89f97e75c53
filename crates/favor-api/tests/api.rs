use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderValue, Method, Request, StatusCode},
};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

use favor_api::middleware::TOKEN_HEADER;
use favor_api::state::AppStateInner;
use favor_api::token::TokenService;
use favor_db::Database;

const SECRET: &str = "integration-secret";

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    let tokens = TokenService::new(SECRET, Duration::hours(24));
    favor_api::router(AppStateInner::new(db, tokens))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> StatusCode {
    send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
    .0
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Register and log in; returns (user id, token).
async fn signup(app: &Router, name: &str) -> (i64, String) {
    let email = format!("{name}@x.com");
    assert_eq!(register(app, name, &email, "pw").await, StatusCode::CREATED);
    let (status, body) = login(app, &email, "pw").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (_, me) = send(app, Method::GET, "/users/me", Some(&token), None).await;
    (me["id"].as_i64().unwrap(), token)
}

async fn befriend(app: &Router, token: &str, friend_id: i64) {
    let (status, _) = send(
        app,
        Method::POST,
        "/friendships",
        Some(token),
        Some(json!({ "friend_id": friend_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn moving_request() -> Value {
    json!({
        "description": "need help moving",
        "category": "labor",
        "location": "Town",
        "price": 20.0,
        "date_time": "2024-01-01 10:00:00"
    })
}

async fn notifications(app: &Router, token: &str) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, "/notifications", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn liveness_check_needs_no_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/test", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "The server is running");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = app();
    assert_eq!(register(&app, "alice", "alice@x.com", "pw1").await, StatusCode::CREATED);

    let status = register(&app, "alice-two", "alice@x.com", "pw2").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The original account still logs in with its own password.
    assert_eq!(login(&app, "alice@x.com", "pw1").await.0, StatusCode::OK);
    assert_eq!(login(&app, "alice@x.com", "pw2").await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_duplicate_registration_has_one_winner() {
    let app = app();
    let (a, b) = tokio::join!(
        register(&app, "racer1", "race@x.com", "pw"),
        register(&app, "racer2", "race@x.com", "pw"),
    );

    let mut codes = [a.as_u16(), b.as_u16()];
    codes.sort();
    assert_eq!(codes, [201, 409]);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    register(&app, "alice", "alice@x.com", "pw1").await;

    let wrong_password = login(&app, "alice@x.com", "nope").await;
    let unknown_email = login(&app, "nobody@x.com", "pw1").await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn login_token_resolves_to_user() {
    let app = app();
    let (id, token) = signup(&app, "alice").await;

    let tokens = TokenService::new(SECRET, Duration::hours(24));
    assert_eq!(tokens.verify(&token).unwrap(), id);

    let (status, me) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "alice");
    assert_eq!(me["email"], "alice@x.com");
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() {
    let app = app();
    let (id, _) = signup(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/friends", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing!");

    let (status, body) = send(&app, Method::GET, "/friends", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid!");

    let expired = TokenService::new(SECRET, Duration::hours(-1)).issue(id).unwrap();
    let (status, body) = send(&app, Method::GET, "/friends", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired!");
}

#[tokio::test]
async fn non_text_token_header_is_invalid_not_missing() {
    let app = app();
    signup(&app, "alice").await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/friends")
        .header(TOKEN_HEADER, HeaderValue::from_bytes(b"abc\xff").unwrap())
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Token is invalid!");

    let (status, body) = send(&app, Method::GET, "/friends", Some("   "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing!");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let app = app();
    let (id, token) = signup(&app, "alice").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/friends", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid!");
}

#[tokio::test]
async fn refresh_issues_new_token_and_keeps_old_one_valid() {
    let app = app();
    let (_, token) = signup(&app, "alice").await;

    let (status, body) = send(&app, Method::POST, "/refresh", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["token"].as_str().unwrap();
    assert_ne!(fresh, token);

    for t in [fresh, token.as_str()] {
        let (status, _) = send(&app, Method::GET, "/friends", Some(t), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn request_fans_out_to_friends_only() {
    let app = app();
    let (_, a) = signup(&app, "a").await;
    let (b_id, b) = signup(&app, "b").await;
    let (c_id, c) = signup(&app, "c").await;
    let (_, d) = signup(&app, "d").await;
    befriend(&app, &a, b_id).await;
    befriend(&app, &a, c_id).await;

    let (status, created) =
        send(&app, Method::POST, "/requests", Some(&a), Some(moving_request())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["date_time"], "2024-01-01 10:00:00");

    for token in [&b, &c] {
        let notes = notifications(&app, token).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["message"], "a created a new request");
        assert_eq!(notes[0]["read"], false);
    }
    assert!(notifications(&app, &d).await.is_empty());
    assert!(notifications(&app, &a).await.is_empty());
}

#[tokio::test]
async fn request_listing_is_friend_scoped() {
    let app = app();
    let (_, x) = signup(&app, "x").await;
    let (f_id, f) = signup(&app, "friend").await;
    let (_, s) = signup(&app, "stranger").await;
    befriend(&app, &x, f_id).await;

    for token in [&x, &f, &s] {
        send(&app, Method::POST, "/requests", Some(token), Some(moving_request())).await;
    }

    let (status, body) = send(&app, Method::GET, "/requests", Some(&x), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["user_id"], f_id);
}

#[tokio::test]
async fn self_friended_user_sees_own_requests() {
    let app = app();
    let (id, token) = signup(&app, "narcissus").await;
    befriend(&app, &token, id).await;

    send(&app, Method::POST, "/requests", Some(&token), Some(moving_request())).await;

    let (_, body) = send(&app, Method::GET, "/requests", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_request_input_is_400() {
    let app = app();
    let (_, token) = signup(&app, "alice").await;

    let mut bad_date = moving_request();
    bad_date["date_time"] = json!("01/01/2024 10am");
    let (status, body) = send(&app, Method::POST, "/requests", Some(&token), Some(bad_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("date_time"));

    let mut negative = moving_request();
    negative["price"] = json!(-5.0);
    let (status, _) = send(&app, Method::POST, "/requests", Some(&token), Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({ "description": "x" });
    let (status, body) = send(&app, Method::POST, "/requests", Some(&token), Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn alice_posts_with_no_friends() {
    let app = app();
    assert_eq!(register(&app, "alice", "alice@x.com", "pw1").await, StatusCode::CREATED);
    let (_, body) = login(&app, "alice@x.com", "pw1").await;
    let alice = body["token"].as_str().unwrap().to_string();
    let (bob_id, bob) = signup(&app, "bob").await;

    let (status, created) =
        send(&app, Method::POST, "/requests", Some(&alice), Some(moving_request())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["description"], "need help moving");
    assert_eq!(created["price"], 20.0);

    assert!(notifications(&app, &alice).await.is_empty());
    assert!(notifications(&app, &bob).await.is_empty());

    // The request is durable: bob sees it once he friends alice.
    let (_, me) = send(&app, Method::GET, "/users/me", Some(&alice), None).await;
    befriend(&app, &bob, me["id"].as_i64().unwrap()).await;
    let (_, listed) = send(&app, Method::GET, "/requests", Some(&bob), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_ne!(listed[0]["user_id"], bob_id);
}

#[tokio::test]
async fn offer_round_trip() {
    let app = app();
    let (_, owner) = signup(&app, "owner").await;
    let (bidder_id, bidder) = signup(&app, "bidder").await;

    let (_, req) = send(&app, Method::POST, "/requests", Some(&owner), Some(moving_request())).await;
    let request_id = req["id"].as_i64().unwrap();

    // No friendship needed to bid.
    let (status, offer) = send(
        &app,
        Method::POST,
        "/offers",
        Some(&bidder),
        Some(json!({ "request_id": request_id, "price": 18.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(offer["accepted"], false);

    let (status, offers) = send(
        &app,
        Method::GET,
        &format!("/requests/{request_id}/offers"),
        Some(&bidder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let offers = offers.as_array().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0]["user_id"], bidder_id);
    assert_eq!(offers[0]["price"], 18.5);
    assert_eq!(offers[0]["accepted"], false);
}

#[tokio::test]
async fn offer_on_missing_request_is_404() {
    let app = app();
    let (_, token) = signup(&app, "bidder").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/offers",
        Some(&token),
        Some(json!({ "request_id": 999, "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Request not found!");
}

#[tokio::test]
async fn only_request_owner_accepts_offers() {
    let app = app();
    let (_, owner) = signup(&app, "owner").await;
    let (_, bidder) = signup(&app, "bidder").await;

    let (_, req) = send(&app, Method::POST, "/requests", Some(&owner), Some(moving_request())).await;
    let (_, offer) = send(
        &app,
        Method::POST,
        "/offers",
        Some(&bidder),
        Some(json!({ "request_id": req["id"], "price": 10.0 })),
    )
    .await;
    let accept_uri = format!("/offers/{}/accept", offer["id"]);

    let (status, _) = send(&app, Method::POST, &accept_uri, Some(&bidder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = send(&app, Method::POST, &accept_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["accepted"], true);

    let (status, _) = send(&app, Method::POST, "/offers/999/accept", Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn friendships_are_one_directional() {
    let app = app();
    let (_, a) = signup(&app, "a").await;
    let (b_id, b) = signup(&app, "b").await;
    befriend(&app, &a, b_id).await;

    let (_, friends) = send(&app, Method::GET, "/friends", Some(&a), None).await;
    assert_eq!(friends, json!([{ "id": b_id, "name": "b" }]));

    let (_, friends) = send(&app, Method::GET, "/friends", Some(&b), None).await;
    assert_eq!(friends, json!([]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/friendships",
        Some(&b),
        Some(json!({ "friend_id": 12345 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_newest_first_and_mark_read() {
    let app = app();
    let (_, a) = signup(&app, "a").await;
    let (b_id, b) = signup(&app, "b").await;
    befriend(&app, &a, b_id).await;

    send(&app, Method::POST, "/requests", Some(&a), Some(moving_request())).await;
    send(&app, Method::POST, "/requests", Some(&a), Some(moving_request())).await;

    let notes = notifications(&app, &b).await;
    assert_eq!(notes.len(), 2);
    assert!(notes[0]["id"].as_i64() > notes[1]["id"].as_i64());

    let newest = notes[0]["id"].as_i64().unwrap();
    let uri = format!("/notifications/{newest}/read");

    let (status, _) = send(&app, Method::POST, &uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, &uri, Some(&b), None).await;
    assert_eq!(status, StatusCode::OK);

    let notes = notifications(&app, &b).await;
    assert_eq!(notes[0]["read"], true);
    assert_eq!(notes[1]["read"], false);
}

#[tokio::test]
async fn update_user_changes_profile_and_password() {
    let app = app();
    let (id, token) = signup(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(&token),
        Some(json!({ "name": "alicia", "email": "alicia@x.com", "password": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(login(&app, "alice@x.com", "pw").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "alicia@x.com", "new-pw").await.0, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/999",
        Some(&token),
        Some(json!({ "name": "x", "email": "x@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found!");
}

#[tokio::test]
async fn update_user_to_taken_email_conflicts() {
    let app = app();
    let (id, token) = signup(&app, "alice").await;
    signup(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(&token),
        Some(json!({ "name": "alice", "email": "bob@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn any_user_may_edit_another_profile() {
    let app = app();
    let (_, mallory) = signup(&app, "mallory").await;
    let (victim_id, _) = signup(&app, "victim").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{victim_id}"),
        Some(&mallory),
        Some(json!({ "name": "renamed", "email": "victim@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_user_cascades_through_api() {
    let app = app();
    let (a_id, a) = signup(&app, "a").await;
    let (b_id, b) = signup(&app, "b").await;
    befriend(&app, &a, b_id).await;
    befriend(&app, &b, a_id).await;

    let (_, req) = send(&app, Method::POST, "/requests", Some(&a), Some(moving_request())).await;
    let request_id = req["id"].as_i64().unwrap();
    send(
        &app,
        Method::POST,
        "/offers",
        Some(&b),
        Some(json!({ "request_id": request_id, "price": 5.0 })),
    )
    .await;

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{a_id}"), Some(&b), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, offers) = send(
        &app,
        Method::GET,
        &format!("/requests/{request_id}/offers"),
        Some(&b),
        None,
    )
    .await;
    assert_eq!(offers, json!([]));
    let (_, friends) = send(&app, Method::GET, "/friends", Some(&b), None).await;
    assert_eq!(friends, json!([]));
    let (_, requests) = send(&app, Method::GET, "/requests", Some(&b), None).await;
    assert_eq!(requests, json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{a_id}"), Some(&b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
