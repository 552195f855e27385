mod common;

use std::time::Duration;

use serde_json::{Value, json};

use common::MockServer;
use synrax::Error;
use synrax::environment::UnittestConfig;
use synrax::remote::RemoteClient;

fn client(server: &MockServer) -> RemoteClient {
    RemoteClient::new(&format!("{}/", server.base_url), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_spec_posts_documentation_and_unwraps_response() {
    let server = MockServer::fixed(
        200,
        &json!({
            "response": {
                "base_url": "http://api.internal",
                "endpoints": [{
                    "name": "/health",
                    "method": "GET",
                    "tests": [{"id": "health-ok", "expect": {"status": [200]}}]
                }]
            }
        })
        .to_string(),
    )
    .await;

    let config = UnittestConfig {
        auth_token: "t0k".into(),
        base_url: "http://localhost:8000".into(),
    };
    let spec = client(&server).fetch_spec("# Widgets API", &config).await.unwrap();

    assert_eq!(spec.base_url, "http://api.internal");
    assert_eq!(spec.case_count(), 1);

    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/ai/test_spec");
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
    let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent["documentation"], json!("# Widgets API"));
    assert_eq!(sent["config"]["base"], json!("http://localhost:8000"));
    assert_eq!(sent["config"]["auth_token"], json!("t0k"));
}

#[tokio::test]
async fn fetch_spec_surfaces_service_errors() {
    let server = MockServer::fixed(500, r#"{"detail":"generator crashed"}"#).await;
    let config = UnittestConfig {
        auth_token: String::new(),
        base_url: "http://localhost:8000".into(),
    };

    let err = client(&server).fetch_spec("docs", &config).await.unwrap_err();
    let Error::Remote(message) = err else {
        panic!("expected remote error, got {err:?}");
    };
    assert!(message.contains("status=500"), "{message}");
    assert!(message.contains("generator crashed"), "{message}");
}

#[tokio::test]
async fn fetch_config_filters_by_repository() {
    let server = MockServer::fixed(
        200,
        r#"{"data":[{"id":"repo-1","base":"http://staging.internal","auth_token":"abc"}]}"#,
    )
    .await;

    let config = client(&server).fetch_config("repo-1").await.unwrap();
    assert_eq!(config.base_url, "http://staging.internal");
    assert_eq!(config.token(), Some("abc"));

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/db/read?table=global_config");
    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent, json!({"filter": {"id": "repo-1"}}));
}

#[tokio::test]
async fn identity_validation_accepts_and_rejects() {
    let server = MockServer::start(|request, _| {
        if request.target.contains("oidc_token=good") {
            (200, r#"{"status":"success"}"#.to_string())
        } else {
            (200, r#"{"status":"failure","reason":"token expired"}"#.to_string())
        }
    })
    .await;
    let remote = client(&server);

    remote.validate_identity("repo-1", "good").await.unwrap();

    let err = remote.validate_identity("repo-1", "bad token").await.unwrap_err();
    assert!(matches!(&err, Error::Remote(reason) if reason == "token expired"), "{err:?}");

    let requests = server.requests();
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path(), "/github/oidc_validate");
    assert!(requests[1].target.contains("oidc_token=bad+token"));
    assert!(requests[1].target.contains("repo_id=repo-1"));
}

#[tokio::test]
async fn identity_validation_rejects_non_success_status() {
    let server = MockServer::fixed(403, "{}").await;
    let err = client(&server).validate_identity("repo-1", "t").await.unwrap_err();
    assert!(matches!(&err, Error::Remote(reason) if reason.contains("403")), "{err:?}");
}
