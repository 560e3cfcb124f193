//! Authentication collaborator.
//!
//! Nothing in the invoice core needs this; it is injected into the HTTP
//! service so requests can carry a bearer token.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::AppSettings;
use crate::error::AuthError;

/// Source of the bearer token attached to API requests.
pub trait TokenSource {
    fn id_token(&self) -> Option<String>;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthSession {
    pub email: String,
    pub user_id: String,
    pub id_token: String,
}

pub trait AuthProvider: TokenSource {
    fn current_user(&self) -> Option<&AuthSession>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<&AuthSession, AuthError>;

    fn sign_out(&mut self) -> Result<(), AuthError>;
}

/// Fixed token, or none. Handy for scripts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn id_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    email: String,
    local_id: String,
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityError,
}

#[derive(Deserialize)]
struct IdentityError {
    message: String,
}

/// Email/password sign-in against an identity-toolkit style endpoint.
///
/// The signed-in session is the one piece of persisted local state: a JSON
/// marker file that `sign_out` removes.
pub struct PasswordAuth {
    http: Client,
    auth_url: String,
    api_key: String,
    session_path: Option<PathBuf>,
    session: Option<AuthSession>,
}

impl PasswordAuth {
    pub fn new(settings: &AppSettings, session_path: Option<PathBuf>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let mut auth = Self {
            http,
            auth_url: settings.auth_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            session_path,
            session: None,
        };
        auth.session = auth.load_session()?;
        Ok(auth)
    }

    fn load_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(path) = &self.session_path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable marker means signed out; drop it so login can write a fresh one.
                tracing::warn!(path = %path.display(), error = %e, "discarding corrupt session file");
                fs::remove_file(path)?;
                Ok(None)
            }
        }
    }

    fn store_session(&self, session: &AuthSession) -> Result<(), AuthError> {
        if let Some(path) = &self.session_path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(session)?)?;
        }
        Ok(())
    }
}

impl TokenSource for PasswordAuth {
    fn id_token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.id_token.clone())
    }
}

impl AuthProvider for PasswordAuth {
    fn current_user(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<&AuthSession, AuthError> {
        let url = format!("{}/accounts:signInWithPassword", self.auth_url);
        tracing::debug!(%url, email, "signing in");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text()?;
            let message = serde_json::from_str::<IdentityErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("status {}", status.as_u16()));
            tracing::warn!(email, %message, "sign-in rejected");
            return Err(AuthError::Rejected(message));
        }

        let body: SignInResponse = response.json()?;
        let session = AuthSession {
            email: body.email,
            user_id: body.local_id,
            id_token: body.id_token,
        };
        self.store_session(&session)?;
        Ok(self.session.insert(session))
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        if self.session.take().is_none() {
            return Err(AuthError::SignedOut);
        }
        if let Some(path) = &self.session_path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
