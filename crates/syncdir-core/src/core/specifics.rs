// crates/syncdir-core/src/core/specifics.rs
// ============================================================================
// Module: Syncdir Entity Specifics
// Description: Structured per-item payloads stored in opaque blob columns.
// Purpose: Carry type-specific rich data with a lossy, non-fatal decoder.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`EntitySpecifics`] holds at most one extension per logical data type.
//! Payloads are serialized as JSON; an empty payload serializes to zero
//! bytes so that NULL columns, empty blobs, and empty payloads are
//! interchangeable. Decoding never fails: empty or unparseable bytes yield
//! the default payload, since rows written by older builds may not match
//! the current shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Extensions
// ============================================================================

/// Bookmark data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkSpecifics {
    /// Target URL (empty for folders).
    pub url: String,
    /// Favicon image bytes.
    pub favicon: Vec<u8>,
}

/// Preference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSpecifics {
    /// Preference name.
    pub name: String,
    /// Serialized preference value.
    pub value: String,
}

/// Password data, opaque to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSpecifics {
    /// Encrypted password record.
    pub encrypted: Vec<u8>,
}

/// Autofill data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofillSpecifics {
    /// Form field name.
    pub name: String,
    /// Form field value.
    pub value: String,
    /// Usage timestamps.
    pub usage_timestamps: Vec<i64>,
}

/// Theme data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSpecifics {
    /// Whether a custom theme is applied.
    pub use_custom_theme: bool,
    /// Custom theme name.
    pub custom_theme_name: String,
    /// Custom theme identifier.
    pub custom_theme_id: String,
}

/// Typed URL data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedUrlSpecifics {
    /// Visited URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Visit timestamps.
    pub visits: Vec<i64>,
}

/// Extension data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSpecifics {
    /// Extension identifier.
    pub id: String,
    /// Installed version.
    pub version: String,
    /// Update manifest URL.
    pub update_url: String,
    /// Whether the extension is enabled.
    pub enabled: bool,
}

/// Encryption key bag data, opaque to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NigoriSpecifics {
    /// Encrypted key bag.
    pub encrypted: Vec<u8>,
}

/// Session data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSpecifics {
    /// Session tag.
    pub session_tag: String,
}

/// App data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSpecifics {
    /// Underlying extension data.
    pub extension: ExtensionSpecifics,
}

// ============================================================================
// SECTION: Entity Specifics
// ============================================================================

/// Structured rich data attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySpecifics {
    /// Bookmark extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<BookmarkSpecifics>,
    /// Preference extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<PreferenceSpecifics>,
    /// Password extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordSpecifics>,
    /// Autofill extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofill: Option<AutofillSpecifics>,
    /// Theme extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeSpecifics>,
    /// Typed URL extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_url: Option<TypedUrlSpecifics>,
    /// Extension extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionSpecifics>,
    /// Key bag extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nigori: Option<NigoriSpecifics>,
    /// Session extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSpecifics>,
    /// App extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<AppSpecifics>,
}

impl EntitySpecifics {
    /// Returns true when no extension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serializes the payload for storage. Empty payloads encode to no bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Parses a stored payload, falling back to the default on any failure.
    #[must_use]
    pub fn from_bytes_lossy(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::BookmarkSpecifics;
    use super::EntitySpecifics;

    #[test]
    fn empty_payload_encodes_to_no_bytes() {
        assert!(EntitySpecifics::default().to_bytes().is_empty());
        assert_eq!(EntitySpecifics::from_bytes_lossy(&[]), EntitySpecifics::default());
    }

    #[test]
    fn malformed_payload_degrades_to_default() {
        let parsed = EntitySpecifics::from_bytes_lossy(b"\x08\x96\x01not json");
        assert_eq!(parsed, EntitySpecifics::default());
    }

    #[test]
    fn bookmark_payload_survives_storage_encoding() {
        let specifics = EntitySpecifics {
            bookmark: Some(BookmarkSpecifics {
                url: "https://example.com/".to_string(),
                favicon: vec![0, 1, 2, 255],
            }),
            ..EntitySpecifics::default()
        };
        let bytes = specifics.to_bytes();
        assert!(!bytes.is_empty());
        assert_eq!(EntitySpecifics::from_bytes_lossy(&bytes), specifics);
    }

    #[test]
    fn unknown_extensions_are_ignored() {
        let parsed = EntitySpecifics::from_bytes_lossy(br#"{"future_type":{"x":1}}"#);
        assert!(parsed.is_empty());
    }
}
