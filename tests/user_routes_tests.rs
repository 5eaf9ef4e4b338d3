// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use auth_api::db::collections;
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_test_app, send_json, signup};

#[tokio::test]
async fn test_health() {
    let (app, _, _) = create_test_app();
    let (status, body) = send_json(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_user_by_id() {
    let (app, _, _) = create_test_app();
    let created = signup(&app, "alice", "alice@example.com", "secret1").await;
    let user_id = created["user"]["id"].as_str().unwrap();

    let (status, body) = send_json(&app, "GET", &format!("/users/{}", user_id), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("createdAt").is_none());
}

#[tokio::test]
async fn test_get_unknown_user_is_200_with_message() {
    let (app, _, _) = create_test_app();

    let (status, body) = send_json(&app, "GET", "/users/no-such-user", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User not found" }));
}

#[tokio::test]
async fn test_me_requires_access_token() {
    let (app, _, _) = create_test_app();
    let created = signup(&app, "alice", "alice@example.com", "secret1").await;

    let (status, body) = send_json(&app, "GET", "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_required");

    let (status, body) = send_json(&app, "GET", "/users/me", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");

    // A refresh token does not authorize API calls.
    let refresh = created["refresh_token"].as_str().unwrap();
    let (status, _) = send_json(&app, "GET", "/users/me", None, Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let access = created["access_token"].as_str().unwrap();
    let (status, body) = send_json(&app, "GET", "/users/me", None, Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created["user"]);
}

#[tokio::test]
async fn test_update_profile() {
    let (app, _, _) = create_test_app();
    let created = signup(&app, "alice", "alice@example.com", "secret1").await;
    let access = created["access_token"].as_str().unwrap();

    let (status, body) = send_json(
        &app,
        "PATCH",
        "/users/me",
        Some(json!({ "username": "alice-renamed", "password": "newsecret" })),
        Some(access),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice-renamed");
    assert_eq!(body["email"], "alice@example.com");

    // Old password no longer works; new one does.
    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/signin",
        Some(json!({ "email": "alice@example.com", "password": "secret1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/signin",
        Some(json!({ "email": "alice@example.com", "password": "newsecret" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice-renamed");
}

#[tokio::test]
async fn test_update_profile_validation() {
    let (app, _, _) = create_test_app();
    let created = signup(&app, "alice", "alice@example.com", "secret1").await;
    let access = created["access_token"].as_str().unwrap();

    let (status, _) = send_json(
        &app,
        "PATCH",
        "/users/me",
        Some(json!({ "password": "123" })),
        Some(access),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "PATCH",
        "/users/me",
        Some(json!({ "username": "x" })),
        Some(access),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_account() {
    let (app, _, store) = create_test_app();
    let created = signup(&app, "alice", "alice@example.com", "secret1").await;
    let access = created["access_token"].as_str().unwrap();

    let (status, body) = send_json(&app, "DELETE", "/users/me", None, Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    assert_eq!(store.count(collections::USERS), 0);
    assert_eq!(store.count(collections::USER_EMAILS), 0);
    assert_eq!(store.count(collections::REFRESH_TOKENS), 0);

    // Access token still verifies but the user is gone.
    let (status, _) = send_json(&app, "GET", "/users/me", None, Some(access)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "DELETE", "/users/me", None, Some(access)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Email is free again.
    signup(&app, "alice", "alice@example.com", "secret2").await;
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _, _) = create_test_app();

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
}
