// crates/spo-core/src/lib.rs
// ============================================================================
// Module: SPO Core
// Description: Domain model for SharePoint Online tenant property listings.
// Purpose: Provide validated site/URL types and the property index decoder.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! This crate holds the I/O-free domain model behind the `spo` CLI: the site
//! connection context, app catalog URL validation, and the decoder that turns
//! the raw `storageentitiesindex` web property into structured tenant storage
//! entities. Decoding distinguishes the benign "no entries" states (absent
//! key, empty string, empty object) from malformed payloads, which surface as
//! an explicit failure variant.
//! Invariants:
//! - No network, filesystem, or clock access anywhere in this crate.
//! - Decoded entries preserve the key order of the source JSON object.
//!
//! Security posture: the raw property value is the untrusted input boundary;
//! the decoder must never panic on arbitrary payloads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod site;
pub mod storage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use site::AppCatalogUrl;
pub use site::AppCatalogUrlError;
pub use site::SiteConnection;
pub use site::SiteUrl;
pub use storage::PropertyIndexOutcome;
pub use storage::StorageEntity;
pub use storage::TenantPropertyIndex;
pub use storage::decode_property_index;
