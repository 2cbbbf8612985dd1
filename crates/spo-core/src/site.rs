// crates/spo-core/src/site.rs
// ============================================================================
// Module: Site Model
// Description: Site connection context and app catalog URL validation.
// Purpose: Provide typed site values and the SharePoint Online URL validator.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! This module defines the connection context handed to the listing pipeline
//! and the validator for user-supplied app catalog URLs. The connection is an
//! explicit value owned by the caller, not ambient process state; the
//! validator is a pure function with no network or auth side effects.
//! Invariants:
//! - [`AppCatalogUrl`] values have passed validation at construction.
//! - Validation accepts only `https://<tenant>.sharepoint.com` hosts whose
//!   path carries an `appcatalog` segment marker.
//!
//! Security posture: candidate URLs are untrusted user input and are rejected
//! on any structural doubt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Site Connection
// ============================================================================

/// Base URL of a SharePoint Online site.
///
/// # Invariants
/// - Opaque UTF-8 string; stored exactly as supplied by the auth subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteUrl(String);

impl SiteUrl {
    /// Creates a new site URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SiteUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SiteUrl {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Session context for the currently connected SharePoint Online site.
///
/// # Invariants
/// - Created by the external auth subsystem before the pipeline runs.
/// - Read-only to the listing pipeline; `connected` gates all network work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConnection {
    /// Base URL of the connected site.
    pub url: SiteUrl,
    /// Whether the session is currently connected.
    pub connected: bool,
}

// ============================================================================
// SECTION: App Catalog URL Validation
// ============================================================================

/// Validated URL of a tenant app catalog site.
///
/// # Invariants
/// - Always an absolute `https` URL on a `<tenant>.sharepoint.com` host.
/// - The path contains an `appcatalog` segment marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCatalogUrl(String);

/// Validation failures for candidate app catalog URLs.
///
/// # Invariants
/// - Variants are stable; the CLI maps them to fixed user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppCatalogUrlError {
    /// No value was supplied, or the value was blank.
    #[error("missing app catalog URL")]
    MissingValue,
    /// The value is not a SharePoint Online app catalog URL.
    #[error("not a SharePoint Online app catalog URL: {url}")]
    NotAppCatalog {
        /// The rejected candidate value.
        url: String,
    },
}

impl AppCatalogUrl {
    /// Validates a candidate app catalog URL.
    ///
    /// Accepts only absolute `https` URLs on a single-label
    /// `<tenant>.sharepoint.com` host, without an explicit port, whose path
    /// denotes an app catalog site. A missing or blank candidate is reported
    /// separately from a structurally invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`AppCatalogUrlError::MissingValue`] when `candidate` is absent
    /// or blank, and [`AppCatalogUrlError::NotAppCatalog`] for every other
    /// rejection.
    pub fn parse(candidate: Option<&str>) -> Result<Self, AppCatalogUrlError> {
        let Some(raw) = candidate else {
            return Err(AppCatalogUrlError::MissingValue);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppCatalogUrlError::MissingValue);
        }
        let rejected = || AppCatalogUrlError::NotAppCatalog {
            url: trimmed.to_string(),
        };
        let parsed = Url::parse(trimmed).map_err(|_| rejected())?;
        if parsed.scheme() != "https" || parsed.port().is_some() {
            return Err(rejected());
        }
        if !parsed.host_str().is_some_and(is_sharepoint_host) {
            return Err(rejected());
        }
        if !has_app_catalog_path(&parsed) {
            return Err(rejected());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the validated URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppCatalogUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns true for single-label `<tenant>.sharepoint.com` hosts.
fn is_sharepoint_host(host: &str) -> bool {
    host.strip_suffix(".sharepoint.com")
        .is_some_and(|tenant| !tenant.is_empty() && !tenant.contains('.'))
}

/// Returns true when some path segment carries the app catalog marker.
fn has_app_catalog_path(url: &Url) -> bool {
    url.path_segments().is_some_and(|mut segments| {
        segments.any(|segment| segment.to_ascii_lowercase().contains("appcatalog"))
    })
}
