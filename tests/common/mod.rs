#![allow(dead_code)]

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use chatwave::{AppState, app, config::Config, db, seed};
use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestApp {
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    /// Fresh in-memory database with the test attendant and `web` channel.
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: "sqlite::memory:".to_owned(),
            listen_addr: "127.0.0.1:0".to_owned(),
            upload_dir: uploads.path().to_owned(),
            secure_cookies: false,
            session_days: 7,
            bcrypt_cost: 4,
            seed_test_user: true,
        };

        let db_pool = db::connect(&config.database_url).await.unwrap();
        seed::run(&db_pool, &config).await.unwrap();

        Self {
            state: AppState { db_pool, config: Arc::new(config) },
            uploads,
        }
    }

    /// A client with its own cookie jar.
    pub fn server(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .build(app(self.state.clone()))
            .unwrap()
    }

    pub async fn attendant(&self) -> TestServer {
        let server = self.server();
        login(&server, seed::TEST_USERNAME, seed::TEST_PASSWORD)
            .await
            .assert_status_ok();
        server
    }

    pub async fn web_channel_id(&self, server: &TestServer) -> String {
        let channels: Value = server.get("/api/channels").await.json();
        channels[0]["id"].as_str().unwrap().to_owned()
    }
}

pub async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await
}

/// Creates a user through the API and returns its id.
pub async fn create_user(attendant: &TestServer, role: &str, username: &str) -> String {
    let response = attendant
        .post(&format!("/api/users/{role}"))
        .json(&json!({
            "username": username,
            "password": "secret123",
            "name": format!("{username} name"),
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_str().unwrap().to_owned()
}

pub async fn create_conversation(
    attendant: &TestServer,
    channel_id: &str,
    client_id: &str,
    attendant_id: &str,
) -> Value {
    let response = attendant
        .post("/api/conversations")
        .json(&json!({
            "title": "Delivery delayed",
            "channelId": channel_id,
            "clientId": client_id,
            "attendantId": attendant_id,
        }))
        .await;
    response.assert_status_ok();
    response.json()
}
