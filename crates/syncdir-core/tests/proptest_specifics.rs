// crates/syncdir-core/tests/proptest_specifics.rs
// ============================================================================
// Module: Payload Property-Based Tests
// Description: Randomized checks for payload storage encoding.
// Purpose: Ensure decoding never fails and non-empty payloads survive storage.
// ============================================================================

//! ## Overview
//! Stored payload bytes may come from older or newer builds, or be damaged.
//! Decoding must always yield a value, and anything this build encodes must
//! decode back to itself.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use syncdir_core::EntitySpecifics;
use syncdir_core::ModelType;
use syncdir_core::PreferenceSpecifics;
use syncdir_core::TypedUrlSpecifics;

proptest! {
    #[test]
    fn arbitrary_bytes_decode_without_failing(
        bytes in proptest::collection::vec(any::<u8>(), 0 .. 256),
    ) {
        let decoded = EntitySpecifics::from_bytes_lossy(&bytes);
        let reencoded = EntitySpecifics::from_bytes_lossy(&decoded.to_bytes());
        prop_assert_eq!(reencoded, decoded);
    }

    #[test]
    fn preference_payloads_survive_storage(name in "\\PC{0,32}", value in "\\PC{0,64}") {
        let specifics = EntitySpecifics {
            preference: Some(PreferenceSpecifics { name, value }),
            ..EntitySpecifics::default()
        };
        let bytes = specifics.to_bytes();
        prop_assert!(!bytes.is_empty());
        prop_assert_eq!(EntitySpecifics::from_bytes_lossy(&bytes), specifics);
    }

    #[test]
    fn typed_url_payloads_keep_their_model_type(
        url in "[a-z]{1,12}",
        visits in proptest::collection::vec(any::<i64>(), 0 .. 8),
    ) {
        let specifics = EntitySpecifics {
            typed_url: Some(TypedUrlSpecifics { url, title: String::new(), visits }),
            ..EntitySpecifics::default()
        };
        let decoded = EntitySpecifics::from_bytes_lossy(&specifics.to_bytes());
        prop_assert_eq!(ModelType::from_specifics(&decoded), ModelType::TypedUrls);
    }
}

#[test]
fn every_real_model_type_survives_its_model_id() {
    for model_type in ModelType::REAL {
        assert_eq!(ModelType::from_model_id(&model_type.model_id()), model_type);
    }
    assert_eq!(ModelType::from_model_id(b"not a payload"), ModelType::Unspecified);
}
