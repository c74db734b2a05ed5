// crates/syncdir-core/src/core/model_type.rs
// ============================================================================
// Module: Syncdir Model Types
// Description: Logical data types and their opaque on-disk identifiers.
// Purpose: Map per-type bookkeeping rows to and from data types.
// Dependencies: crate::core::specifics, serde
// ============================================================================

//! ## Overview
//! A [`ModelType`] names one logical data type synchronized through the
//! directory. Per-type bookkeeping is keyed on disk by an opaque model id:
//! the stored encoding of an [`EntitySpecifics`] carrying that type's default
//! extension. Decoding reports the first extension present, so ids written
//! by other builds still resolve as long as the extension key matches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::specifics::AppSpecifics;
use crate::core::specifics::AutofillSpecifics;
use crate::core::specifics::BookmarkSpecifics;
use crate::core::specifics::EntitySpecifics;
use crate::core::specifics::ExtensionSpecifics;
use crate::core::specifics::NigoriSpecifics;
use crate::core::specifics::PasswordSpecifics;
use crate::core::specifics::PreferenceSpecifics;
use crate::core::specifics::SessionSpecifics;
use crate::core::specifics::ThemeSpecifics;
use crate::core::specifics::TypedUrlSpecifics;

// ============================================================================
// SECTION: Model Type
// ============================================================================

/// Logical data type of a synchronized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// No recognizable type.
    Unspecified,
    /// Permanent top-level folder; never carries typed data.
    TopLevelFolder,
    /// Bookmarks.
    Bookmarks,
    /// Preferences.
    Preferences,
    /// Passwords.
    Passwords,
    /// Autofill entries.
    Autofill,
    /// Themes.
    Themes,
    /// Typed URLs.
    TypedUrls,
    /// Extensions.
    Extensions,
    /// Encryption key bag.
    Nigori,
    /// Sessions.
    Sessions,
    /// Apps.
    Apps,
}

impl ModelType {
    /// Every type that carries synchronized data and its own bookkeeping row.
    pub const REAL: [Self; 10] = [
        Self::Bookmarks,
        Self::Preferences,
        Self::Passwords,
        Self::Autofill,
        Self::Themes,
        Self::TypedUrls,
        Self::Extensions,
        Self::Nigori,
        Self::Sessions,
        Self::Apps,
    ];

    /// Returns true for types listed in [`ModelType::REAL`].
    #[must_use]
    pub const fn is_real(self) -> bool {
        !matches!(self, Self::Unspecified | Self::TopLevelFolder)
    }

    /// Returns the stable label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::TopLevelFolder => "top_level_folder",
            Self::Bookmarks => "bookmarks",
            Self::Preferences => "preferences",
            Self::Passwords => "passwords",
            Self::Autofill => "autofill",
            Self::Themes => "themes",
            Self::TypedUrls => "typed_urls",
            Self::Extensions => "extensions",
            Self::Nigori => "nigori",
            Self::Sessions => "sessions",
            Self::Apps => "apps",
        }
    }

    /// Determines the type of a payload from the first extension present.
    #[must_use]
    pub const fn from_specifics(specifics: &EntitySpecifics) -> Self {
        if specifics.bookmark.is_some() {
            Self::Bookmarks
        } else if specifics.preference.is_some() {
            Self::Preferences
        } else if specifics.password.is_some() {
            Self::Passwords
        } else if specifics.autofill.is_some() {
            Self::Autofill
        } else if specifics.theme.is_some() {
            Self::Themes
        } else if specifics.typed_url.is_some() {
            Self::TypedUrls
        } else if specifics.extension.is_some() {
            Self::Extensions
        } else if specifics.nigori.is_some() {
            Self::Nigori
        } else if specifics.session.is_some() {
            Self::Sessions
        } else if specifics.app.is_some() {
            Self::Apps
        } else {
            Self::Unspecified
        }
    }

    /// Returns a payload carrying this type's default extension.
    #[must_use]
    pub fn default_specifics(self) -> EntitySpecifics {
        let mut specifics = EntitySpecifics::default();
        match self {
            Self::Unspecified | Self::TopLevelFolder => {}
            Self::Bookmarks => specifics.bookmark = Some(BookmarkSpecifics::default()),
            Self::Preferences => specifics.preference = Some(PreferenceSpecifics::default()),
            Self::Passwords => specifics.password = Some(PasswordSpecifics::default()),
            Self::Autofill => specifics.autofill = Some(AutofillSpecifics::default()),
            Self::Themes => specifics.theme = Some(ThemeSpecifics::default()),
            Self::TypedUrls => specifics.typed_url = Some(TypedUrlSpecifics::default()),
            Self::Extensions => specifics.extension = Some(ExtensionSpecifics::default()),
            Self::Nigori => specifics.nigori = Some(NigoriSpecifics::default()),
            Self::Sessions => specifics.session = Some(SessionSpecifics::default()),
            Self::Apps => specifics.app = Some(AppSpecifics::default()),
        }
        specifics
    }

    /// Returns the opaque identifier persisted for this type.
    #[must_use]
    pub fn model_id(self) -> Vec<u8> {
        self.default_specifics().to_bytes()
    }

    /// Resolves a persisted model identifier; unknown ids map to `Unspecified`.
    #[must_use]
    pub fn from_model_id(model_id: &[u8]) -> Self {
        Self::from_specifics(&EntitySpecifics::from_bytes_lossy(model_id))
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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

    use super::ModelType;

    #[test]
    fn every_real_type_round_trips_through_its_model_id() {
        for model_type in ModelType::REAL {
            let model_id = model_type.model_id();
            assert!(!model_id.is_empty());
            assert_eq!(ModelType::from_model_id(&model_id), model_type);
        }
    }

    #[test]
    fn model_ids_are_distinct() {
        let ids: std::collections::BTreeSet<Vec<u8>> =
            ModelType::REAL.iter().map(|model_type| model_type.model_id()).collect();
        assert_eq!(ids.len(), ModelType::REAL.len());
    }

    #[test]
    fn garbage_model_ids_are_unspecified() {
        assert_eq!(ModelType::from_model_id(b"\x0a\x00"), ModelType::Unspecified);
        assert_eq!(ModelType::from_model_id(b""), ModelType::Unspecified);
        assert_eq!(ModelType::from_model_id(br#"{"unknown":{}}"#), ModelType::Unspecified);
    }

    #[test]
    fn non_real_types_are_excluded() {
        assert!(!ModelType::Unspecified.is_real());
        assert!(!ModelType::TopLevelFolder.is_real());
        assert!(ModelType::REAL.iter().all(|model_type| model_type.is_real()));
    }
}
