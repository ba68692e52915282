//! LemmyClient tests against an in-process axum server speaking the relevant
//! subset of the Lemmy v3 API.

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use fedaccounts::{
    AccountRegistry, Credential,
    remote::{AuthError, Authenticator, InstanceProbe, LemmyClient, ProbeError, ProfileError},
    store::MemoryStore,
};
use serde_json::{Value, json};

const GOOD_JWT: &str = "good-jwt";

async fn site(headers: HeaderMap) -> Json<Value> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let my_user = match bearer {
        Some(value) if value == format!("Bearer {GOOD_JWT}") => json!({
            "local_user_view": { "person": { "name": "alice", "id": 1 } }
        }),
        _ => Value::Null,
    };
    Json(json!({ "site_view": {}, "my_user": my_user }))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let user = body["username_or_email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (user, password) {
        ("pending", _) => (
            StatusCode::OK,
            Json(json!({ "jwt": null, "verify_email_sent": true })),
        ),
        ("alice" | "alice@mail.example", "pw") => {
            (StatusCode::OK, Json(json!({ "jwt": GOOD_JWT })))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "incorrect_login" })),
        ),
    }
}

/// Start a fake instance, returning its base URL.
async fn spawn_instance() -> String {
    let router = Router::new()
        .route("/api/v3/site", get(site))
        .route("/api/v3/user/login", post(login));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind address");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn test_probe_running_instance() {
    let instance = spawn_instance().await;
    let client = LemmyClient::new().unwrap();

    client.probe(&instance).await.unwrap();
}

#[tokio::test]
async fn test_probe_closed_port_is_unreachable() {
    let instance = closed_port().await;
    let client = LemmyClient::new().unwrap();

    let err = client.probe(&instance).await.unwrap_err();
    assert!(matches!(err, ProbeError::Unreachable { .. }));
}

#[tokio::test]
async fn test_probe_non_lemmy_path_is_bad_status() {
    let instance = format!("{}/not-lemmy", spawn_instance().await);
    let client = LemmyClient::new().unwrap();

    let err = client.probe(&instance).await.unwrap_err();
    assert!(matches!(err, ProbeError::BadStatus { status: 404 }));
}

#[tokio::test]
async fn test_login_and_profile() {
    let instance = spawn_instance().await;
    let client = LemmyClient::new().unwrap();

    let credential = client
        .login(&instance, "alice@mail.example", "pw")
        .await
        .unwrap();
    assert_eq!(credential.as_str(), GOOD_JWT);

    let profile = client.fetch_profile(&instance, &credential).await.unwrap();
    assert_eq!(profile.username, "alice");
}

#[tokio::test]
async fn test_login_rejected_carries_error_field() {
    let instance = spawn_instance().await;
    let client = LemmyClient::new().unwrap();

    let err = client.login(&instance, "alice", "wrong").await.unwrap_err();
    match err {
        AuthError::Rejected { reason } => assert_eq!(reason, "incorrect_login"),
        other => panic!("Expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_token() {
    let instance = spawn_instance().await;
    let client = LemmyClient::new().unwrap();

    let err = client.login(&instance, "pending", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
}

#[tokio::test]
async fn test_profile_with_unknown_token() {
    let instance = spawn_instance().await;
    let client = LemmyClient::new().unwrap();

    let err = client
        .fetch_profile(&instance, &Credential::new("forged"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::NotLoggedIn));
}

#[tokio::test]
async fn test_registry_over_http() {
    let instance = spawn_instance().await;
    let client = Arc::new(LemmyClient::new().unwrap());
    let registry =
        AccountRegistry::open(Arc::new(MemoryStore::new()), client.clone(), client).await;

    registry.add_instance(&instance, false).await.unwrap();
    let username = registry
        .add_account(&instance, "alice@mail.example", "pw")
        .await
        .unwrap();

    assert_eq!(username, "alice");
    assert_eq!(registry.default_username().as_deref(), Some("alice"));
    assert_eq!(registry.default_instance().as_deref(), Some(instance.as_str()));
    assert_eq!(
        registry.default_credential_for(&instance),
        Some(Credential::new(GOOD_JWT))
    );
}
