//! Error types for each layer, plus the umbrella [`Error`] used by the binary.

use thiserror::Error;

use crate::model::TemplateType;
use crate::validate::ErrorMap;

/// Failures talking to the invoice REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No signed-in user, so no token to send.
    #[error("Unauthorized action. Please sign in.")]
    Unauthenticated,

    /// Server answered 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-success status; the message comes from the response body when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in failed: {0}")]
    Rejected(String),

    #[error("Not signed in")]
    SignedOut,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Invalid template type selected ({0:?}). Cannot create payload.")]
    UnknownTemplate(TemplateType),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Please fix the errors before saving.")]
    Invalid(ErrorMap),

    #[error("A save is already in progress")]
    SubmitInProgress,

    #[error("Invoice already saved")]
    AlreadySaved,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a configuration directory")]
    NoConfigDir,

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write settings.toml: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
