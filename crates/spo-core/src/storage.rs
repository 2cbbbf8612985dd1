// crates/spo-core/src/storage.rs
// ============================================================================
// Module: Storage Entities
// Description: Tenant storage entity model and property index decoding.
// Purpose: Decode the raw storageentitiesindex property into ordered entries.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Tenant storage entities live in a single web property holding a
//! JSON-encoded object of `name -> { Value, Description?, Comment? }` records.
//! This module models those records and decodes the raw property value with a
//! three-way policy: absent/empty payloads and empty objects are benign "no
//! entries" states, while malformed payloads are an explicit decode failure.
//! Invariants:
//! - Decoding preserves the key order of the source object.
//! - Optional source fields stay optional in the model; display substitution
//!   is the presentation layer's concern.
//!
//! Security posture: the raw property value is untrusted; decoding is total
//! and never panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Entry Model
// ============================================================================

/// One named tenant storage entity record.
///
/// # Invariants
/// - `value` is always present when the entry exists.
/// - Absent `description`/`comment` is a renderable state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntity {
    /// Entry value.
    #[serde(rename = "Value")]
    pub value: String,
    /// Optional human-readable description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional operator comment.
    #[serde(rename = "Comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Ordered mapping from entry name to storage entity.
///
/// # Invariants
/// - Entry order matches the source object's key order.
/// - Produced transiently per invocation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantPropertyIndex {
    /// Entries in source order.
    entries: Vec<(String, StorageEntity)>,
}

impl TenantPropertyIndex {
    /// Builds an index from entries already in source order.
    #[must_use]
    pub fn from_entries(entries: Vec<(String, StorageEntity)>) -> Self {
        Self {
            entries,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StorageEntity)> {
        self.entries.iter().map(|(name, entity)| (name.as_str(), entity))
    }

    /// Looks up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StorageEntity> {
        self.entries.iter().find(|(entry, _)| entry == name).map(|(_, entity)| entity)
    }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decode outcome for the raw property value.
///
/// # Invariants
/// - `NoEntries` covers the absent key, the empty string, and `{}` alike.
/// - `DecodeFailure` is distinct from the benign absent/empty states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyIndexOutcome {
    /// The property is absent, empty, or decodes to an empty object.
    NoEntries,
    /// The property decodes to one or more entries in source order.
    Entries(TenantPropertyIndex),
    /// The property exists but cannot be decoded.
    DecodeFailure(String),
}

/// Decodes the raw `storageentitiesindex` property value.
///
/// Policy, in order: absent key or empty string is [`PropertyIndexOutcome::NoEntries`];
/// payloads that fail to parse, parse to a non-object, or contain a record
/// without a string `Value` are [`PropertyIndexOutcome::DecodeFailure`]; a
/// parsed empty object is `NoEntries`; anything else yields entries in source
/// key order.
#[must_use]
pub fn decode_property_index(raw: Option<&str>) -> PropertyIndexOutcome {
    let Some(raw) = raw else {
        return PropertyIndexOutcome::NoEntries;
    };
    if raw.is_empty() {
        return PropertyIndexOutcome::NoEntries;
    }
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => return PropertyIndexOutcome::DecodeFailure(err.to_string()),
    };
    let Value::Object(records) = value else {
        return PropertyIndexOutcome::DecodeFailure(String::from(
            "tenant property index is not a JSON object",
        ));
    };
    if records.is_empty() {
        return PropertyIndexOutcome::NoEntries;
    }
    let mut entries = Vec::with_capacity(records.len());
    for (name, record) in records {
        match serde_json::from_value::<StorageEntity>(record) {
            Ok(entity) => entries.push((name, entity)),
            Err(err) => {
                return PropertyIndexOutcome::DecodeFailure(format!("entry '{name}': {err}"));
            }
        }
    }
    PropertyIndexOutcome::Entries(TenantPropertyIndex::from_entries(entries))
}
