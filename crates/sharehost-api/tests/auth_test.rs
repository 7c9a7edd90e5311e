//! Login and authorization integration tests.
//!
//! Run with: `cargo test -p sharehost-api --test auth_test`

mod helpers;

use helpers::{setup_test_app, PASSWORD};
use sharehost_core::{UserRole, UserStore};

#[tokio::test]
async fn test_login_issues_token_once() {
    let app = setup_test_app().await;
    let token = app.create_user("alice", UserRole::User).await;

    let stored = app.users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.token.as_deref(), Some(token.as_str()));

    let response = app
        .client()
        .post("/login")
        .json(&serde_json::json!({ "username": "alice", "password": PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["token"], token.as_str());
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = setup_test_app().await;
    app.create_user("alice", UserRole::User).await;

    let wrong_password = app
        .client()
        .post("/login")
        .json(&serde_json::json!({ "username": "alice", "password": "nope" }))
        .await;
    assert_eq!(wrong_password.status_code(), 401);

    let unknown_user = app
        .client()
        .post("/login")
        .json(&serde_json::json!({ "username": "mallory", "password": PASSWORD }))
        .await;
    assert_eq!(unknown_user.status_code(), 401);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_test_app().await;
    let token = app.create_user("alice", UserRole::User).await;

    assert_eq!(app.client().get("/files").await.status_code(), 401);

    let garbage = app
        .client()
        .get("/files")
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    assert_eq!(garbage.status_code(), 401);

    let raw = app
        .client()
        .get("/files")
        .add_header("Authorization", token.clone())
        .await;
    assert_eq!(raw.status_code(), 200);

    let bearer = app
        .client()
        .get("/files")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(bearer.status_code(), 200);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = setup_test_app().await;
    let token = app.create_user("alice", UserRole::User).await;
    app.create_user("bob", UserRole::User).await;

    let list = app
        .client()
        .get("/files/bob")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(list.status_code(), 403);

    let delete = app
        .client()
        .delete("/delete-user/bob")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(delete.status_code(), 403);
    assert!(app.users.find_by_username("bob").await.unwrap().is_some());
}

#[tokio::test]
async fn test_root_redirects() {
    let app = setup_test_app().await;
    let response = app.client().get("/").await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/");
}
