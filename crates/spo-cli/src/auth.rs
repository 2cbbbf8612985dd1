// crates/spo-cli/src/auth.rs
// ============================================================================
// Module: Access Token Provider
// Description: Async seam for acquiring SharePoint Online bearer tokens.
// Purpose: Keep token acquisition pluggable and its failures verbatim.
// Dependencies: async-trait, spo-core, thiserror, time
// ============================================================================

//! ## Overview
//! Token acquisition is delegated to an external auth subsystem; this module
//! defines the async seam the listing pipeline consumes and the production
//! implementation backed by the stored connection profile. Provider error
//! text is surfaced to the user verbatim, so messages here are written as
//! final output.
//!
//! ## Invariants
//! - A provider failure means no network fetch is attempted.
//! - Token material never appears in `Debug` output.
//!
//! Security posture: tokens are secrets; they are redacted from diagnostics
//! and never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use spo_core::SiteUrl;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Token Types
// ============================================================================

/// Opaque bearer token presented on authenticated requests.
///
/// # Invariants
/// - The token value is redacted from `Debug` output.
#[derive(Clone)]
pub(crate) struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token value.
    #[must_use]
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Consumes the wrapper and returns the raw token value.
    #[must_use]
    pub(crate) fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Token acquisition failures.
///
/// # Invariants
/// - `Display` text is shown to the user unmodified; variants read as final
///   output, not as internal diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AuthError {
    /// No token is stored for the connected site.
    #[error("No access token available for {site}")]
    MissingToken {
        /// Connected site URL.
        site: String,
    },
    /// The stored token expired before this invocation.
    #[error("Access token for {site} expired on {expires_on}")]
    ExpiredToken {
        /// Connected site URL.
        site: String,
        /// Stored expiry timestamp.
        expires_on: String,
    },
    /// The stored expiry timestamp is not a valid RFC 3339 value.
    #[error("Invalid token expiry timestamp in the stored connection: {value}")]
    InvalidExpiry {
        /// The unparseable timestamp value.
        value: String,
    },
}

// ============================================================================
// SECTION: Provider Seam
// ============================================================================

/// Async source of bearer tokens for a connected site.
#[async_trait]
pub(crate) trait AccessTokenProvider: Send + Sync {
    /// Yields a bearer token for `site`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when no usable token can be produced; the error
    /// text is surfaced to the user verbatim.
    async fn access_token(&self, site: &SiteUrl) -> Result<AccessToken, AuthError>;
}

/// Provider serving the token persisted in the connection profile.
///
/// # Invariants
/// - An empty stored token counts as missing.
/// - A stored expiry in the past fails before any network work.
pub(crate) struct StoredAccessTokenProvider {
    /// Raw token from the connection profile, when present.
    token: Option<String>,
    /// RFC 3339 expiry timestamp from the connection profile, when present.
    expires_on: Option<String>,
}

impl StoredAccessTokenProvider {
    /// Creates a provider over the stored token material.
    #[must_use]
    pub(crate) const fn new(token: Option<String>, expires_on: Option<String>) -> Self {
        Self {
            token,
            expires_on,
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StoredAccessTokenProvider {
    async fn access_token(&self, site: &SiteUrl) -> Result<AccessToken, AuthError> {
        let Some(token) = self.token.as_deref().filter(|token| !token.is_empty()) else {
            return Err(AuthError::MissingToken {
                site: site.to_string(),
            });
        };
        if let Some(expires_on) = self.expires_on.as_deref() {
            let expiry = OffsetDateTime::parse(expires_on, &Rfc3339).map_err(|_| {
                AuthError::InvalidExpiry {
                    value: expires_on.to_string(),
                }
            })?;
            if expiry <= OffsetDateTime::now_utc() {
                return Err(AuthError::ExpiredToken {
                    site: site.to_string(),
                    expires_on: expires_on.to_string(),
                });
            }
        }
        Ok(AccessToken::new(token))
    }
}
