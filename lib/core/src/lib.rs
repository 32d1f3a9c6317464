//! # Thumbprint Core
//!
//! Core library for the thumbprint fingerprint simulator.
//!
//! This crate provides the identity primitives:
//!
//! - [`TraitValue`] / [`TraitRecord`] - Schema-less, insertion-ordered trait bags
//! - [`flatten`] - `path:value` tokenization of nested records
//! - [`compute_thumbmark`] - Deterministic 16-hex-character identifier
//! - [`observe`] / [`build_observations`] - Session-to-session change notes
//! - [`estimate_uniqueness`] - Rarity heuristic for a browser trait set
//! - [`generate_synthetic_identities`] - Random candidate pools
//!
//! ## Example
//!
//! ```rust
//! use thumbprint_core::{compute_thumbmark, flatten, record_from_json};
//! use serde_json::json;
//!
//! let a = record_from_json(json!({"os": "Arch Linux", "fonts": ["Roboto", "Fira Code"]})).unwrap();
//! let b = record_from_json(json!({"fonts": ["Roboto", "Fira Code"], "os": "Arch Linux"})).unwrap();
//!
//! assert_eq!(flatten(&a), vec!["os:Arch Linux", "fonts:Roboto", "fonts:Fira Code"]);
//! assert_eq!(compute_thumbmark(&a), compute_thumbmark(&b));
//! ```

pub mod error;
pub mod value;
pub mod flatten;
pub mod thumbmark;
pub mod fingerprint;
pub mod observe;
pub mod identity;
pub mod uniqueness;
pub mod synthetic;

pub use error::{Error, Result};
pub use value::{TraitValue, TraitRecord, record_from_json};
pub use flatten::{flatten, flatten_with_prefix, try_flatten, MAX_TRAIT_DEPTH};
pub use thumbmark::{
    compute_thumbmark, try_compute_thumbmark, thumbmark_from_tokens, record_thumbmark,
    thumbmark_similarity, THUMBMARK_LEN, NEAR_MISS_SCALE,
};
pub use fingerprint::{
    SafeFingerprint, ScreenTraits, ViewportTraits, StoredFingerprint, ThumbmarkSource, RecognitionMeta,
};
pub use observe::{Observation, observe, build_observations};
pub use identity::{ensure_identity, ensure_record_identity, generate_id};
pub use uniqueness::{UniquenessEstimate, estimate_uniqueness};
pub use synthetic::generate_synthetic_identities;
