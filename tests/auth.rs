use invoice_desk::config::{AppSettings, session_path};
use invoice_desk::{AuthError, AuthProvider, PasswordAuth, TokenSource};
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

fn settings(uri: &str) -> AppSettings {
    AppSettings {
        auth_url: uri.to_string(),
        api_key: "test-key".into(),
        timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_in_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "email": "test@billchain.com", "returnSecureToken": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "jwt-abc",
            "email": "test@billchain.com",
            "localId": "uid-1",
            "refreshToken": "r",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let marker = session_path(dir.path());
    let settings = settings(&server.uri());

    let (token, reloaded_user, still_there, after_sign_out) = tokio::task::spawn_blocking(move || {
        let mut auth = PasswordAuth::new(&settings, Some(marker.clone())).unwrap();
        assert!(!auth.is_authenticated());
        auth.sign_in("test@billchain.com", "123456").unwrap();
        let token = auth.id_token();

        let mut reloaded = PasswordAuth::new(&settings, Some(marker.clone())).unwrap();
        let user = reloaded.current_user().map(|u| u.user_id.clone());
        let still_there = marker.exists();
        reloaded.sign_out().unwrap();
        (token, user, still_there, marker.exists())
    })
    .await
    .unwrap();

    assert_eq!(token.as_deref(), Some("jwt-abc"));
    assert_eq!(reloaded_user.as_deref(), Some("uid-1"));
    assert!(still_there);
    assert!(!after_sign_out);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_PASSWORD" }
        })))
        .mount(&server)
        .await;

    let settings = settings(&server.uri());
    let (result, authenticated) = tokio::task::spawn_blocking(move || {
        let mut auth = PasswordAuth::new(&settings, None).unwrap();
        let result = auth.sign_in("test@billchain.com", "wrong").map(|_| ());
        (result, auth.is_authenticated())
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(AuthError::Rejected(ref m)) if m == "INVALID_PASSWORD"));
    assert!(!authenticated);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_out_without_session() {
    let settings = AppSettings::default();
    let err = tokio::task::spawn_blocking(move || {
        let mut auth = PasswordAuth::new(&settings, None).unwrap();
        auth.sign_out().unwrap_err()
    })
    .await
    .unwrap();
    assert!(matches!(err, AuthError::SignedOut));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_session_file_counts_as_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "jwt-fresh",
            "email": "test@billchain.com",
            "localId": "uid-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let marker = session_path(dir.path());
    std::fs::write(&marker, "{ truncated").unwrap();
    let settings = settings(&server.uri());

    let (authenticated, marker_left, sign_out, token, rewritten) = tokio::task::spawn_blocking(move || {
        let mut auth = PasswordAuth::new(&settings, Some(marker.clone())).unwrap();
        let authenticated = auth.is_authenticated();
        let marker_left = marker.exists();
        let sign_out = auth.sign_out();
        auth.sign_in("test@billchain.com", "123456").unwrap();
        let rewritten = PasswordAuth::new(&settings, Some(marker.clone()))
            .unwrap()
            .current_user()
            .map(|u| u.user_id.clone());
        (authenticated, marker_left, sign_out, auth.id_token(), rewritten)
    })
    .await
    .unwrap();

    assert!(!authenticated);
    assert!(!marker_left);
    assert!(matches!(sign_out, Err(AuthError::SignedOut)));
    assert_eq!(token.as_deref(), Some("jwt-fresh"));
    assert_eq!(rewritten.as_deref(), Some("uid-2"));
}
