//! Session manager driven through the real HTTP client against a mock backend.

use std::sync::Arc;

use flowmatic_client::FlowmaticClient;
use flowmatic_session::error::NETWORK_MESSAGE;
use flowmatic_session::{FileStorage, SessionManager, SessionStorage, StorageKeys};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager_for(base_url: &str, storage: Arc<FileStorage>) -> SessionManager {
    let client = FlowmaticClient::builder().base_url(base_url).build().unwrap();
    let manager = SessionManager::new(Arc::new(client), storage);
    manager.restore();
    manager
}

#[tokio::test]
async fn test_login_logout_round_trip_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "u1", "email": "ada@example.com"},
            "tokens": {"accessToken": "at", "refreshToken": "rt", "expiresIn": 3600}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer at"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(temp.path()).unwrap());
    let manager = manager_for(&server.uri(), storage.clone());

    manager.login("ada@example.com", "pw").await.unwrap();
    assert!(manager.state().is_authenticated);

    let keys = StorageKeys::default();
    let expiry = storage.get_item(&keys.token_expiry).unwrap().unwrap();
    let expiry: serde_json::Value = serde_json::from_str(&expiry).unwrap();
    assert_eq!(expiry["expiresIn"], 3600);
    assert!(expiry["expiresAt"].is_string());

    // a fresh manager on the same file picks the session back up
    let reopened = manager_for(&server.uri(), Arc::new(FileStorage::new(temp.path()).unwrap()));
    assert!(reopened.state().is_authenticated);

    manager.logout().await;
    assert!(!manager.state().is_authenticated);
    for key in keys.all() {
        assert!(storage.get_item(key).unwrap().is_none());
    }
}

#[tokio::test]
async fn test_backend_rejection_message_reaches_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    let manager = manager_for(&server.uri(), Arc::new(FileStorage::new(temp.path()).unwrap()));

    assert!(manager.login("ada@example.com", "nope").await.is_err());
    assert_eq!(
        manager.state().error.as_deref(),
        Some("Invalid email or password")
    );
}

#[tokio::test]
async fn test_unreachable_backend_reports_network_message() {
    let temp = tempdir().unwrap();
    let manager = manager_for(
        "http://127.0.0.1:1",
        Arc::new(FileStorage::new(temp.path()).unwrap()),
    );

    assert!(manager.login("ada@example.com", "pw").await.is_err());
    let state = manager.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some(NETWORK_MESSAGE));
}

#[tokio::test]
async fn test_register_confirmation_leaves_storage_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "u2", "email": "new@example.com"},
            "requiresEmailConfirmation": true
        })))
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(temp.path()).unwrap());
    let manager = manager_for(&server.uri(), storage.clone());

    let outcome = manager.register("new@example.com", "pw").await.unwrap();
    assert_eq!(
        outcome,
        flowmatic_session::RegisterOutcome::ConfirmationRequired {
            email: "new@example.com".to_string()
        }
    );
    for key in StorageKeys::default().all() {
        assert!(storage.get_item(key).unwrap().is_none());
    }
}
