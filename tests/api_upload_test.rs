//! Tests for /api/upload.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestApp};
use inkline::models::{AppConfig, BlobKind};
use inkline::services::BlobStore;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_upload_png_reports_image_info() {
    let app = TestApp::new();
    let png = fixtures::sample_png(120, 80);

    let response = app
        .post_file("/api/upload", "image", "photo.png", "image/png", &png)
        .await;
    common::assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["success"], true);

    let filename = json["filename"].as_str().unwrap();
    assert!(filename.ends_with("_photo.png"), "got {filename}");
    assert_eq!(
        json["preview_url"].as_str().unwrap(),
        format!("/api/files/uploads/{filename}")
    );

    let info = &json["image_info"];
    assert_eq!(info["width"], 120);
    assert_eq!(info["height"], 80);
    assert_eq!(info["format"], "png");
    assert_eq!(info["size_bytes"], png.len() as u64);
    assert_eq!(info["aspect_ratio"], 1.5);

    assert!(app.store.exists(BlobKind::Uploads, filename).await.unwrap());
}

#[tokio::test]
async fn test_upload_names_are_unique() {
    let app = TestApp::new();
    let png = fixtures::sample_png(16, 16);

    let first = app.upload("same.png", &png).await;
    let second = app.upload("same.png", &png).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_upload_sanitizes_client_path() {
    let app = TestApp::new();
    let png = fixtures::sample_png(16, 16);

    let filename = app.upload("../../etc/evil name.png", &png).await;
    assert!(filename.ends_with("_evil_name.png"), "got {filename}");
    assert!(!filename.contains('/'));
}

#[tokio::test]
async fn test_upload_jpeg() {
    let app = TestApp::new();
    let jpeg = fixtures::sample_jpeg(64, 48);

    let response = app
        .post_file("/api/upload", "image", "scan.jpg", "image/jpeg", &jpeg)
        .await;
    common::assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["image_info"]["format"], "jpeg");
    assert_eq!(json["image_info"]["width"], 64);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let app = TestApp::new();

    let response = app
        .post_file("/api/upload", "image", "notes.txt", "text/plain", b"hello")
        .await;
    let message = common::assert_error(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(message.contains("notes.txt"), "got {message}");
}

#[tokio::test]
async fn test_upload_rejects_undecodable_image() {
    let app = TestApp::new();

    let response = app
        .post_file("/api/upload", "image", "broken.png", "image/png", b"not a png")
        .await;
    common::assert_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_image_field() {
    let app = TestApp::new();
    let png = fixtures::sample_png(8, 8);

    let response = app
        .post_file("/api/upload", "file", "photo.png", "image/png", &png)
        .await;
    let message = common::assert_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Missing required field: image");
}

#[tokio::test]
async fn test_upload_over_limit() {
    let app = TestApp::with_config(AppConfig {
        max_upload_bytes: 1024 * 1024,
        ..AppConfig::default()
    });
    let oversized = vec![0u8; 1024 * 1024 + 1];

    let response = app
        .post_file("/api/upload", "image", "huge.png", "image/png", &oversized)
        .await;
    let message = common::assert_error(&response, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(message, "File too large. Maximum size is 1MB");
}
