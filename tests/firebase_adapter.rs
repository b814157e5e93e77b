//! Firebase adapter against a mocked Identity Toolkit endpoint.

use std::sync::Arc;
use std::time::Duration;

use quizzapp::backend::config::IdentityTimeouts;
use quizzapp::backend::firebase::FirebaseBackend;
use quizzapp::backend::{BackendError, IdentityBackend};
use quizzapp::services::auth::{AuthGateway, IdentityGateway};
use quizzapp::session::SessionStore;
use quizzapp::state::auth::AuthController;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
const SIGN_UP_PATH: &str = "/v1/accounts:signUp";

fn client(server: &MockServer, store: &SessionStore, request_secs: u64) -> FirebaseBackend {
    let timeouts = IdentityTimeouts { request_secs, connect_secs: 2 };
    let base_url = format!("{}/v1", server.uri());
    FirebaseBackend::new("test-key".to_owned(), base_url, timeouts, store.clone()).unwrap()
}

fn credentials(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password, "returnSecureToken": true })
}

#[tokio::test]
async fn sign_in_posts_credentials_and_stores_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(credentials("ana@example.com", "secret1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-42",
            "email": "ana@example.com",
            "displayName": "Ana",
            "idToken": "tok",
            "registered": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend = client(&server, &store, 5);
    let session = backend
        .sign_in_with_credentials("ana@example.com", "secret1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(session.uid, "uid-42");
    assert_eq!(session.display_name.as_deref(), Some("Ana"));
    assert_eq!(store.current(), Some(session));
}

#[tokio::test]
async fn sign_up_uses_sign_up_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_UP_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(credentials("new@example.com", "secret1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-new",
            "email": "new@example.com",
            "idToken": "t"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend = client(&server, &store, 5);
    let session = backend
        .create_account_with_credentials("new@example.com", "secret1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(session.display_name, None);
    assert_eq!(backend.current_session().map(|s| s.uid), Some("uid-new".to_owned()));
}

#[tokio::test]
async fn rejection_keeps_provider_message_and_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "INVALID_LOGIN_CREDENTIALS",
                "errors": [{ "message": "INVALID_LOGIN_CREDENTIALS", "domain": "global", "reason": "invalid" }]
            }
        })))
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend = client(&server, &store, 5);
    let err = backend
        .sign_in_with_credentials("ana@example.com", "nope")
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::rejected(400, "INVALID_LOGIN_CREDENTIALS"));
    assert!(store.current().is_none());
}

#[tokio::test]
async fn success_without_local_id_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_UP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#SignupNewUserResponse"
        })))
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend = client(&server, &store, 5);
    let outcome = backend
        .create_account_with_credentials("new@example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(outcome, None);
    assert!(store.current().is_none());
}

#[tokio::test]
async fn stalled_provider_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "localId": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend = client(&server, &store, 1);
    let err = backend
        .sign_in_with_credentials("ana@example.com", "secret1")
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "unexpected error: {err:?}");
    assert!(!err.to_string().contains("test-key"));
    assert!(store.current().is_none());
}

#[tokio::test]
async fn stalled_provider_does_not_leave_controller_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let backend: Arc<dyn IdentityBackend> = Arc::new(client(&server, &store, 1));
    let gateway: Arc<dyn AuthGateway> = Arc::new(IdentityGateway::new(backend));
    let controller = AuthController::new(gateway);
    controller.on_email_change("ana@example.com");
    controller.on_password_change("secret1");

    controller.login().expect("dispatch").await.unwrap();

    let state = controller.snapshot();
    assert!(!state.is_loading);
    assert!(!state.success);
    let error = state.error.expect("timeout should surface as an error");
    assert!(!error.contains("test-key"));
    assert!(controller.current_user().is_none());
}

#[tokio::test]
async fn unreachable_provider_is_transport_error_without_key() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let store = SessionStore::new();
    let timeouts = IdentityTimeouts { request_secs: 5, connect_secs: 2 };
    let backend = FirebaseBackend::new("test-key".to_owned(), format!("http://{addr}/v1"), timeouts, store).unwrap();
    let err = backend
        .sign_in_with_credentials("ana@example.com", "secret1")
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "unexpected error: {err:?}");
    assert!(!err.to_string().contains("test-key"));
}
