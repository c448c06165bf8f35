mod common;

use axum::http::StatusCode;
use chatwave::seed;
use common::{TestApp, create_user, login};
use serde_json::{Value, json};

#[tokio::test]
async fn login_sets_a_session() {
    let app = TestApp::new().await;
    let server = app.server();

    let response = login(&server, seed::TEST_USERNAME, seed::TEST_PASSWORD).await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["username"], seed::TEST_USERNAME);
    assert_eq!(user["role"], "attendant");
    assert!(user.get("password").is_none());

    let me: Value = server.get("/api/auth/me").await.json();
    assert_eq!(me["id"], user["id"]);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let server = app.server();

    let response = login(&server, seed::TEST_USERNAME, "nope-nope").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "invalid credentials");

    login(&server, "nobody", "whatever").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_credentials_are_a_bad_request() {
    let app = TestApp::new().await;
    let server = app.server();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "", "password": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let app = TestApp::new().await;
    let server = app.server();

    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "not authenticated");

    server.get("/api/conversations").await.assert_status(StatusCode::UNAUTHORIZED);
    server.get("/api/channels").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    let server = app.attendant().await;

    let response = server.post("/api/auth/logout").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    server.get("/api/auth/me").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_user_loses_access() {
    let app = TestApp::new().await;
    let attendant = app.attendant().await;
    let id = create_user(&attendant, "attendants", "marta").await;

    let marta = app.server();
    login(&marta, "marta", "secret123").await.assert_status_ok();

    attendant
        .delete(&format!("/api/users/attendants/{id}"))
        .await
        .assert_status_ok();

    let response = marta.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "user not found");
}

#[tokio::test]
async fn clients_cannot_manage_users() {
    let app = TestApp::new().await;
    let attendant = app.attendant().await;
    create_user(&attendant, "clients", "joana").await;

    let client = app.server();
    login(&client, "joana", "secret123").await.assert_status_ok();

    client.get("/api/users/clients").await.assert_status(StatusCode::FORBIDDEN);
    client
        .post("/api/users/attendants")
        .json(&json!({ "username": "sneaky", "password": "secret123", "name": "Sneaky" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
