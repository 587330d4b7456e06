//! Failure injection tests for the registration pipeline.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_write_failure_is_isolated() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;
    let client = common::client();

    let ok = client
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "good.example.com", "port": 3000, "serviceName": "good"}))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let good_before = std::fs::read(dir.path().join("good.example.com.yaml")).unwrap();

    // A non-empty directory squatting on the target path makes the commit fail.
    let blocked = dir.path().join("blocked.example.com.yaml");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("occupant"), b"x").unwrap();

    let res = client
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "blocked.example.com", "port": 3000, "serviceName": "blocked"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = res.json().await.unwrap();
    let detail = err["detail"].as_str().unwrap();
    assert_eq!(detail, "Failed to store routing configuration");
    assert!(!detail.contains(dir.path().to_str().unwrap()));

    // Only the successful registration reloaded; the other document is untouched.
    assert_eq!(registrar.plane.calls(), 1);
    assert_eq!(
        std::fs::read(dir.path().join("good.example.com.yaml")).unwrap(),
        good_before
    );
    assert_eq!(
        common::files_in(dir.path()),
        vec!["blocked.example.com.yaml", "good.example.com.yaml"]
    );
}

#[tokio::test]
async fn test_reload_failure_keeps_document_and_hides_internals() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;
    registrar.plane.fail_next_reloads(true);

    let res = common::client()
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "app.example.com", "port": 4000, "serviceName": "myapp"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = res.json().await.unwrap();
    let detail = err["detail"].as_str().unwrap();
    assert!(!detail.contains("coolify-proxy"), "leaked internal error: {}", detail);

    assert!(dir.path().join("app.example.com.yaml").exists());
    assert_eq!(registrar.plane.calls(), 1);
}

#[tokio::test]
async fn test_missing_directory_fails_without_reload() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(&dir.path().join("not-created")).await;

    let res = common::client()
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "app.example.com", "port": 4000, "serviceName": "myapp"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(registrar.plane.calls(), 0);
    assert!(common::files_in(dir.path()).is_empty());
}
