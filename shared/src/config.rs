use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::capabilities::{HttpError, ValidatedUrl};
use crate::{DEFAULT_COMPANY_FALLBACK, DEFAULT_ENDPOINT, DEFAULT_LOCAL_ID_PREFIX};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] HttpError),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What a successful load does with records created locally in the
/// meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// The remote sequence replaces everything.
    #[default]
    ReplaceAll,
    /// Local records stay at the front, ahead of the remote sequence.
    PreserveLocal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub endpoint: String,
    pub preserve_local_on_reload: bool,
    pub local_id_prefix: String,
    pub local_company_fallback: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            preserve_local_on_reload: false,
            local_id_prefix: DEFAULT_LOCAL_ID_PREFIX.to_string(),
            local_company_fallback: DEFAULT_COMPANY_FALLBACK.to_string(),
        }
    }
}

impl DirectoryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;

        if self.local_id_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "local_id_prefix",
                reason: "must not be empty".into(),
            });
        }
        if self.local_id_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "local_id_prefix",
                reason: "must not contain whitespace".into(),
            });
        }
        if self.local_company_fallback.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "local_company_fallback",
                reason: "must not be blank".into(),
            });
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<ValidatedUrl, ConfigError> {
        Ok(ValidatedUrl::new(self.endpoint.as_str())?)
    }

    pub fn reload_policy(&self) -> ReloadPolicy {
        if self.preserve_local_on_reload {
            ReloadPolicy::PreserveLocal
        } else {
            ReloadPolicy::ReplaceAll
        }
    }
}
