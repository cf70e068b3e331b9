#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod detail;
pub mod event;
pub mod loader;
pub mod model;
pub mod session;
pub mod store;
pub mod validate;
pub mod view;

use serde::{Deserialize, Serialize};

pub use app::{DeletePrompt, Directory, Model, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, DirectoryConfig, ReloadPolicy};
pub use event::Event;
pub use loader::{LoadError, LoadOutcome, LoadState};
pub use model::{Record, RecordFields, RecordId, RecordPatch};
pub use store::StoreHandle;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_LOCAL_ID_PREFIX: &str = "local-";
pub const DEFAULT_COMPANY_FALLBACK: &str = "Local Company";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    NotFound,
    RateLimited,
    Deserialization,
    Server,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// UI-facing error. `message` is for logs; the banner in
/// [`ViewModel::error_message`] shows [`AppError::user_facing_message`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Validation => "The server rejected the request.".into(),
            ErrorKind::NotFound => "The user list could not be found.".into(),
            ErrorKind::RateLimited => {
                "Too many requests. Please wait a moment and try again.".into()
            }
            ErrorKind::Deserialization => {
                "The server sent data we could not read. Please try again later.".into()
            }
            ErrorKind::Server => "The server had a problem. Please try again later.".into(),
            ErrorKind::Unknown => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        let kind = match status {
            400 | 422 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP error: {status}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        e.to_app_error()
    }
}
