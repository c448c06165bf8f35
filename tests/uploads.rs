mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use common::TestApp;
use serde_json::Value;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n not really an image";

fn avatar(bytes: &'static [u8], file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part("avatar", Part::bytes(bytes).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn avatar_is_stored_and_served() {
    let app = TestApp::new().await;
    let attendant = app.attendant().await;

    let response = attendant
        .post("/api/upload/avatar")
        .multipart(avatar(PNG, "me.png", "image/png"))
        .await;
    response.assert_status_ok();
    let url = response.json::<Value>()["avatarUrl"].as_str().unwrap().to_owned();
    assert!(url.starts_with("/uploads/avatars/avatar-"));
    assert!(url.ends_with(".png"));

    let stored = app.uploads.path().join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(stored).unwrap(), PNG);

    let served = attendant
        .get(&url)
        .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("http://elsewhere.example"))
        .await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), PNG);
    assert_eq!(served.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn non_images_are_rejected() {
    let app = TestApp::new().await;
    let attendant = app.attendant().await;

    let response = attendant
        .post("/api/upload/avatar")
        .multipart(avatar(b"#!/bin/sh", "run.sh", "text/x-shellscript"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "only images are allowed (jpeg, jpg, png, gif)");
}

#[tokio::test]
async fn missing_file_is_rejected() {
    let app = TestApp::new().await;
    let attendant = app.attendant().await;

    let form = MultipartForm::new().add_text("note", "forgot the file");
    let response = attendant.post("/api/upload/avatar").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "no file uploaded");
}

#[tokio::test]
async fn uploading_requires_a_session() {
    let app = TestApp::new().await;
    let anonymous = app.server();

    anonymous
        .post("/api/upload/avatar")
        .multipart(avatar(PNG, "me.png", "image/png"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
