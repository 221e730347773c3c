//! Integration tests for Firebase authentication
//!
//! A wiremock server stands in for the Identity Toolkit API.

use app_core::auth::{AuthBackend, AuthError};
use networking::firebase::{FirebaseAuth, FirebaseConfig};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth(server: &MockServer) -> FirebaseAuth {
    FirebaseAuth::new(FirebaseConfig::new("api-key").with_base_url(server.uri())).unwrap()
}

fn error_body(message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": 400,
            "message": message,
            "errors": [{"message": message, "domain": "global", "reason": "invalid"}]
        }
    })
}

#[tokio::test]
async fn test_sign_in_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "api-key"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret1",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-alice",
            "email": "alice@example.com",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600",
            "registered": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth(&server);
    let user = auth.sign_in("alice@example.com", "secret1").await.unwrap();

    assert_eq!(user.uid, "uid-alice");
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert!(!user.is_anonymous);
    assert_eq!(auth.current_user().await, Some(user));
    assert_eq!(auth.id_token().await.as_deref(), Some("id-token"));
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("INVALID_LOGIN_CREDENTIALS")))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth(&server);
    let err = auth.sign_in("alice@example.com", "wrong").await.unwrap_err();

    assert_eq!(err, AuthError::InvalidCredentials);
    assert!(auth.current_user().await.is_none());
}

#[tokio::test]
async fn test_sign_up_success_then_sign_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .and(query_param("key", "api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-bob",
            "email": "bob@example.com",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600"
        })))
        .mount(&server)
        .await;

    let auth = auth(&server);
    let user = auth.sign_up("bob@example.com", "secret1").await.unwrap();
    assert_eq!(user.uid, "uid-bob");
    assert!(auth.is_signed_in().await);

    auth.sign_out().await.unwrap();
    assert!(auth.current_user().await.is_none());
    assert!(auth.id_token().await.is_none());
}

#[tokio::test]
async fn test_sign_up_existing_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("EMAIL_EXISTS")))
        .mount(&server)
        .await;

    let err = auth(&server).sign_up("alice@example.com", "secret1").await.unwrap_err();
    assert_eq!(err, AuthError::EmailAlreadyInUse);
}

#[tokio::test]
async fn test_sign_up_weak_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        )))
        .mount(&server)
        .await;

    let err = auth(&server).sign_up("carol@example.com", "abc").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::WeakPassword("Password should be at least 6 characters".to_string())
    );
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = auth(&server).sign_up("dave@example.com", "secret1").await.unwrap_err();
    assert!(matches!(err, AuthError::Service(_)));
}
