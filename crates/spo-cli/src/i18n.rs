// crates/spo-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The SPO CLI stores user-facing strings in a small translation catalog to
//! enforce consistent messaging and to prepare for future locales. All
//! runtime output should be routed through the [`t!`](crate::t) macro, with
//! one deliberate exception: auth provider failures pass their error text
//! through verbatim.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - The English catalog is authoritative for compatibility-contract strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        SUPPORTED_LOCALES.iter().copied().find(|locale| locale.as_str() == lang)
    }
}

/// Ordered list of supported CLI locales.
///
/// # Invariants
/// - Ordering is stable for deterministic presentation.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries loaded into the localized message bundle.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "spo {version}"),
    ("main.error", "Error: {message}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
    ("connection.read_failed", "Failed to read the connection file at {path}: {error}"),
    ("connection.parse_failed", "Failed to parse the connection file at {path}: {error}"),
    (
        "connection.read_too_large",
        "Refusing to read the connection file at {path} because it is {size} bytes (limit \
         {limit}).",
    ),
    ("connection.connect_first", "Connect to a SharePoint Online site first"),
    ("storageentity.list.missing_url", "Missing required option appCatalogUrl"),
    (
        "storageentity.list.invalid_url",
        "{url} is not a valid SharePoint Online app catalog URL",
    ),
    ("storageentity.list.retrieving", "Retrieving tenant storage entities from {url}..."),
    ("storageentity.list.fetch_failed", "Failed to retrieve tenant properties: {error}"),
    ("storageentity.list.none_found", "No tenant properties found"),
    ("storageentity.list.entry.key", "Key: {name}"),
    ("storageentity.list.entry.value", "Value: {value}"),
    ("storageentity.list.entry.description", "Description: {description}"),
    ("storageentity.list.entry.comment", "Comment: {comment}"),
    ("storageentity.list.not_set", "not set"),
];

/// Static Catalan catalog entries mirroring [`CATALOG_EN`].
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "spo {version}"),
    ("main.error", "Error: {message}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
    (
        "connection.read_failed",
        "No s'ha pogut llegir el fitxer de connexió a {path}: {error}",
    ),
    (
        "connection.parse_failed",
        "No s'ha pogut analitzar el fitxer de connexió a {path}: {error}",
    ),
    (
        "connection.read_too_large",
        "Es rebutja llegir el fitxer de connexió a {path} perquè té {size} bytes (límit \
         {limit}).",
    ),
    ("connection.connect_first", "Connecteu-vos primer a un lloc de SharePoint Online"),
    ("storageentity.list.missing_url", "Falta l'opció obligatòria appCatalogUrl"),
    (
        "storageentity.list.invalid_url",
        "{url} no és un URL vàlid del catàleg d'aplicacions de SharePoint Online",
    ),
    (
        "storageentity.list.retrieving",
        "S'estan recuperant les entitats d'emmagatzematge del tenant de {url}...",
    ),
    (
        "storageentity.list.fetch_failed",
        "No s'han pogut recuperar les propietats del tenant: {error}",
    ),
    ("storageentity.list.none_found", "No s'han trobat propietats del tenant"),
    ("storageentity.list.entry.key", "Clau: {name}"),
    ("storageentity.list.entry.value", "Valor: {value}"),
    ("storageentity.list.entry.description", "Descripció: {description}"),
    ("storageentity.list.entry.comment", "Comentari: {comment}"),
    ("storageentity.list.not_set", "no establert"),
];

/// Returns the raw catalog entries for the requested locale.
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    let map = match locale {
        Locale::En => &CATALOG_EN_MAP,
        Locale::Ca => &CATALOG_CA_MAP,
    };
    map.get_or_init(|| catalog_entries_for(locale).iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
