// crates/spo-cli/src/spo_client.rs
// ============================================================================
// Module: SharePoint Client
// Description: HTTP client for SharePoint Online REST web property reads.
// Purpose: Retrieve the tenant storage entity index from a connected site.
// Dependencies: reqwest, serde, spo-core
// ============================================================================

//! ## Overview
//! Provides the minimal SharePoint Online REST client the CLI needs: a single
//! authenticated `GET` against `_api/web/AllProperties` selecting the
//! `storageentitiesindex` web property.
//!
//! Security posture: server responses are untrusted; apply size limits, fail
//! closed on parsing errors, and never log bearer tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use spo_core::SiteUrl;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum web property response body size accepted by the CLI.
pub(crate) const MAX_PROPERTIES_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// SharePoint client configuration.
///
/// # Invariants
/// - `site_url` is the connected site the request is issued against.
/// - `bearer_token` is attached to every request and never logged.
#[derive(Clone)]
pub(crate) struct SpoClientConfig {
    /// Connected site URL the request targets.
    pub site_url: SiteUrl,
    /// Bearer token for the `Authorization` header.
    pub bearer_token: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for SpoClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoClientConfig")
            .field("site_url", &self.site_url)
            .field("bearer_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SharePoint client errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
/// - String payloads are user-facing and may include untrusted server text.
#[derive(Debug, Error)]
pub(crate) enum SpoClientError {
    /// Configuration error.
    #[error("client config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status from the site.
    #[error("http status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Trimmed response body text.
        body: String,
    },
    /// Response payload parsing error.
    #[error("invalid response payload: {0}")]
    Json(String),
    /// Response size exceeds limits.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

/// `_api/web/AllProperties` response payload.
///
/// # Invariants
/// - Values are untrusted and unvalidated; the decoder treats the index text
///   as hostile input.
#[derive(Debug, Deserialize)]
struct WebAllProperties {
    /// JSON-encoded tenant property index, when the web carries one.
    #[serde(rename = "storageentitiesindex", default)]
    storage_entities_index: Option<String>,
}

// ============================================================================
// SECTION: Client Implementation
// ============================================================================

/// SharePoint Online REST client for web property reads.
pub(crate) struct SpoClient {
    /// Reqwest client instance.
    client: Client,
    /// Connected site URL the request targets.
    site_url: SiteUrl,
    /// Bearer token for the `Authorization` header.
    bearer_token: String,
}

impl SpoClient {
    /// Builds a new SharePoint client.
    ///
    /// # Errors
    ///
    /// Returns [`SpoClientError`] when the HTTP client cannot be constructed.
    pub(crate) fn new(config: SpoClientConfig) -> Result<Self, SpoClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| SpoClientError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            site_url: config.site_url,
            bearer_token: config.bearer_token,
        })
    }

    /// Fetches the raw `storageentitiesindex` web property.
    ///
    /// Returns `None` when the web carries no such property.
    ///
    /// # Errors
    ///
    /// Returns [`SpoClientError`] when the request fails, the site answers
    /// with a non-success status, or the response payload is invalid.
    pub(crate) async fn fetch_property_index(&self) -> Result<Option<String>, SpoClientError> {
        let url = format!(
            "{}/_api/web/AllProperties?$select=storageentitiesindex",
            self.site_url.as_str().trim_end_matches('/')
        );
        let headers = self.headers()?;
        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|err| SpoClientError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, MAX_PROPERTIES_RESPONSE_BYTES).await?;
        if !status.is_success() {
            let preview = String::from_utf8_lossy(&body);
            return Err(SpoClientError::Http {
                status: status.as_u16(),
                body: preview.trim().to_string(),
            });
        }
        let parsed: WebAllProperties = serde_json::from_slice(&body)
            .map_err(|err| SpoClientError::Json(format!("invalid web properties payload: {err}")))?;
        Ok(parsed.storage_entities_index)
    }

    /// Builds request headers for the web property read.
    ///
    /// # Errors
    ///
    /// Returns [`SpoClientError`] when the bearer token is not a valid header
    /// value.
    fn headers(&self) -> Result<HeaderMap, SpoClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let value = format!("Bearer {}", self.bearer_token);
        let header = HeaderValue::from_str(&value)
            .map_err(|_| SpoClientError::Config("invalid bearer token header".to_string()))?;
        headers.insert(AUTHORIZATION, header);
        Ok(headers)
    }
}

// ============================================================================
// SECTION: HTTP Helpers
// ============================================================================

/// Reads an HTTP response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SpoClientError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| SpoClientError::Transport(err.to_string()))?
    {
        let next_total =
            total.checked_add(chunk.len()).ok_or(SpoClientError::ResponseTooLarge {
                actual: usize::MAX,
                limit,
            })?;
        if next_total > limit {
            return Err(SpoClientError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}
