//! Client integration tests against a mock backend.

use flowmatic_client::{
    AuthPaths, CreateProjectRequest, Credentials, Error, FlowmaticClient, UpdateProjectRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FlowmaticClient {
    FlowmaticClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_login_stamps_token_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "u1", "email": "ada@example.com", "name": "Ada"},
            "tokens": {"accessToken": "at", "refreshToken": "rt", "expiresIn": 3600}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .auth()
        .login(&Credentials::new("ada@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(response.user.name.as_deref(), Some("Ada"));
    let tokens = response.tokens.unwrap();
    assert_eq!(tokens.access_token, "at");
    assert!(tokens.expires_at.is_some());
    assert!(!tokens.is_expired_at(chrono::Utc::now()));
}

#[tokio::test]
async fn test_login_rejection_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .auth()
        .login(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_error_without_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .auth()
        .register(&Credentials::new("ada@example.com", "pw"))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_custom_auth_paths_and_logout_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/session/end"))
        .and(header("authorization", "Bearer at"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = FlowmaticClient::builder()
        .base_url(server.uri())
        .auth_paths(AuthPaths {
            logout: "v2/session/end".to_string(),
            ..AuthPaths::default()
        })
        .build()
        .unwrap();

    client.auth().logout("at").await.unwrap();
}

#[tokio::test]
async fn test_refresh_sends_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "rt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": {"accessToken": "at2", "refreshToken": "rt2", "expiresIn": 60}
        })))
        .mount(&server)
        .await;

    let response = client_for(&server).auth().refresh("rt").await.unwrap();
    assert_eq!(response.tokens.access_token, "at2");
    assert!(response.tokens.expires_at.is_some());
    assert!(response.user.is_none());
}

#[tokio::test]
async fn test_projects_crud() {
    let server = MockServer::start().await;
    let project = json!({"id": "p1", "name": "Roadmap", "status": "active"});

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("authorization", "Bearer at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_json(json!({"name": "Roadmap"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(project.clone()))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/projects/p1"))
        .and(body_json(json!({"status": "archived"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1", "name": "Roadmap", "status": "archived"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/projects/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no such project"})))
        .mount(&server)
        .await;

    let client = FlowmaticClient::builder()
        .base_url(server.uri())
        .auth_token("at")
        .build()
        .unwrap();
    let projects = client.projects();

    let listed = projects.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Roadmap");

    let created = projects
        .create(CreateProjectRequest {
            name: "Roadmap".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "p1");

    let updated = projects
        .update(
            "p1",
            UpdateProjectRequest {
                status: Some("archived".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status.as_deref(), Some("archived"));

    projects.delete("p1").await.unwrap();

    let err = projects.get("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("no such project"));
}

#[tokio::test]
async fn test_health_unreachable_backend() {
    let client = FlowmaticClient::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    assert!(!client.health().is_healthy().await);
    let err = client.health().check().await.unwrap_err();
    assert!(err.is_transport());
}
