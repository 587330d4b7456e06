//! End-to-end tests for `POST /add-domain`.

use reqwest::StatusCode;
use route_registrar::routing::RoutingDescriptor;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_add_domain_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;

    let res = common::client()
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "app.example.com", "port": 4000, "serviceName": "myapp"}))
        .send()
        .await
        .expect("registrar unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"message": "Domain added successfully!"}));

    let written = std::fs::read_to_string(dir.path().join("app.example.com.yaml")).unwrap();
    let descriptor: RoutingDescriptor = serde_yaml::from_str(&written).unwrap();

    let http = descriptor.router("myapp-http").unwrap();
    assert_eq!(http.middlewares, vec!["redirect-to-https"]);
    assert_eq!(http.rule, "Host(`app.example.com`)");

    let https = descriptor.router("myapp-https").unwrap();
    assert_eq!(https.tls.as_ref().unwrap().cert_resolver, "letsencrypt");

    let service = descriptor.service("myapp").unwrap();
    assert_eq!(service.load_balancer.servers[0].url, "http://myapp:4000");

    assert_eq!(registrar.plane.calls(), 1);
}

#[tokio::test]
async fn test_repeated_request_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;
    let client = common::client();
    let body = json!({"domain": "app.example.com", "port": 4000, "serviceName": "myapp"});

    let first = client.post(registrar.url("/add-domain")).json(&body).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let before = std::fs::read(dir.path().join("app.example.com.yaml")).unwrap();

    let second = client.post(registrar.url("/add-domain/")).json(&body).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let after = std::fs::read(dir.path().join("app.example.com.yaml")).unwrap();

    assert_eq!(before, after);
    assert_eq!(common::files_in(dir.path()), vec!["app.example.com.yaml"]);
}

#[tokio::test]
async fn test_legacy_container_name_field() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;

    let res = common::client()
        .post(registrar.url("/add-domain/"))
        .json(&json!({"domain": "newdomain.hostspacecloud.com", "port": 4000, "container_name": "myapp"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(dir.path().join("newdomain.hostspacecloud.com.yaml").exists());
}

#[tokio::test]
async fn test_invalid_requests_never_touch_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;
    let client = common::client();

    let cases = [
        (json!({"domain": "", "port": 80, "serviceName": "svc"}), "domain"),
        (json!({"domain": "bad domain!.com", "port": 80, "serviceName": "svc"}), "domain"),
        (json!({"domain": "../../etc/passwd", "port": 80, "serviceName": "svc"}), "domain"),
        (json!({"domain": "a.example.com", "port": 0, "serviceName": "svc"}), "port"),
        (json!({"domain": "a.example.com", "port": 65536, "serviceName": "svc"}), "port"),
        (json!({"domain": "a.example.com", "port": 80, "serviceName": ""}), "serviceName"),
        (json!({"domain": "a.example.com", "port": 80, "serviceName": "svc_1"}), "serviceName"),
    ];

    for (body, field) in cases {
        let res = client.post(registrar.url("/add-domain")).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "accepted {}", body);

        let err: Value = res.json().await.unwrap();
        let detail = err["detail"].as_str().unwrap();
        assert!(detail.starts_with(field), "detail {:?} should name {}", detail, field);
    }

    assert!(common::files_in(dir.path()).is_empty());
    assert_eq!(registrar.plane.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_unprocessable() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;

    let res = common::client()
        .post(registrar.url("/add-domain"))
        .json(&json!({"domain": "a.example.com", "port": "eighty"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert!(err["detail"].is_string());
    assert!(common::files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_health_reports_strategy() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;

    let res = common::client().get(registrar.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["reload_strategy"], "recording");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let registrar = common::start_registrar(dir.path()).await;

    // Default listener limit is 64 KiB.
    let res = common::client()
        .post(registrar.url("/add-domain"))
        .json(&json!({
            "domain": "big.example.com",
            "port": 4000,
            "serviceName": "x".repeat(100 * 1024),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(common::files_in(dir.path()).is_empty());
    assert_eq!(registrar.plane.calls(), 0);
}
