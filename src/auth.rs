//! Session precheck against the REST API.
//!
//! The assistant socket authenticates by the `access_token` cookie and
//! closes with policy violation when it is missing or invalid. Checking
//! `GET /auth/me` first gives the caller a readable error instead of a
//! silently closed socket.

use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::ChatConfig;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("not logged in: no access token configured")]
    MissingToken,
    #[error("session rejected by server (HTTP {0})")]
    Rejected(StatusCode),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Verify that the configured access token belongs to a live session.
///
/// # Errors
///
/// Returns [`AuthError::MissingToken`] without a network call when no token
/// is configured, [`AuthError::Rejected`] for non-success statuses, and
/// transport errors otherwise.
pub async fn verify_session(config: &ChatConfig) -> Result<(), AuthError> {
    let headers = auth_headers(config)?;

    let response = reqwest::Client::new()
        .get(config.auth_me_url())
        .headers(headers)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Rejected(status));
    }

    debug!(%status, "session verified");
    Ok(())
}

fn auth_headers(config: &ChatConfig) -> Result<HeaderMap, AuthError> {
    let cookie = config.cookie_header().ok_or(AuthError::MissingToken)?;
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
    Ok(headers)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
