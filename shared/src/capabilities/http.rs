//! HTTP types that cross from `crux_http` into the core's own events.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;

/// An absolute http(s) URL with a host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let invalid = |reason: String| HttpError::InvalidUrl {
            url: truncate_url(&url),
            reason,
        };

        if url.trim().is_empty() {
            return Err(invalid("URL cannot be empty".to_string()));
        }
        if url.len() > MAX_URL_LENGTH {
            return Err(invalid(format!(
                "URL exceeds maximum length of {MAX_URL_LENGTH} bytes"
            )));
        }

        let parsed = Url::parse(&url).map_err(|e| invalid(e.to_string()))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(format!(
                "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
            )));
        }
        let Some(host) = parsed.host_str() else {
            return Err(invalid("URL must have a host".to_string()));
        };
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL are not allowed".to_string()));
        }

        Ok(Self {
            host: host.to_lowercase(),
            url: parsed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

fn truncate_url(url: &str) -> String {
    if url.len() <= 100 {
        url.to_string()
    } else {
        let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &url[..cut])
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{message}")]
    Transport { message: String },
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

pub type HttpResult = Result<HttpResponse, HttpError>;

/// Flattens what `crux_http` hands back into [`HttpResult`], so events stay
/// plain serializable data.
pub fn into_http_result(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> HttpResult {
    match result {
        Ok(mut response) => {
            let status = u16::from(response.status());
            let body = response.take_body().unwrap_or_default();
            Ok(HttpResponse::new(status, body))
        }
        Err(e) => Err(HttpError::Transport {
            message: e.to_string(),
        }),
    }
}
