use log::warn;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

pub(crate) const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

pub(crate) const CONFIG_ERROR_REDIRECT_WITH_AUTH: &str =
    "redirects must stay disabled when auth is configured";

/// Error body returned by the Keycloak server.
///
/// Admin endpoints report failures as `{"errorMessage": ...}`, while the
/// OAuth-facing endpoints use `{"error": ..., "error_description": ...}`.
/// Whichever field is present ends up in `message`, with the HTTP status
/// reason as a last resort.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub code: i32,
    #[serde(skip)]
    pub message: String,
    pub error: Option<String>,
    #[serde(rename = "error_description")]
    pub error_description: Option<String>,
    pub error_message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "code={}", self.code)
        } else {
            write!(f, "code={}, message={}", self.code, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("missing Location header in create response")]
    MissingLocation,
    #[error("keycloak api error: {0}")]
    Api(ApiError),
}

pub(crate) fn fallback_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| status.to_string())
    } else {
        text.to_string()
    }
}

pub(crate) fn read_body_with_limit(
    resp: &mut reqwest::blocking::Response,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = resp.read(&mut chunk)?;
        if read == 0 {
            return Ok(body);
        }
        if body.len() + read > limit {
            body.extend_from_slice(&chunk[..limit - body.len()]);
            warn!("error response body exceeds {limit} bytes; truncating");
            return Ok(body);
        }
        body.extend_from_slice(&chunk[..read]);
    }
}

#[cfg(feature = "async-client")]
pub(crate) async fn read_body_with_limit_async(
    resp: &mut reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > limit {
            body.extend_from_slice(&chunk[..limit - body.len()]);
            warn!("error response body exceeds {limit} bytes; truncating");
            return Ok(body);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
