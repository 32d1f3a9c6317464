//! # Thumbprint Similarity
//!
//! Similarity scoring and ranking of fingerprint identities.
//!
//! This crate compares schema-less trait records and ranks a candidate pool
//! against a query identity with explainable results.
//!
//! ## Features
//!
//! - **Field Similarity**: Per-value comparison dispatched on the value's type
//! - **Token Jaccard**: Whole-record overlap over flattened `path:value` tokens
//! - **Blended Ranking**: Thumbmark, field and token signals combined by configurable weights
//! - **Explainability**: Per-field breakdown and signal scores for every match
//!
//! ## Example
//!
//! ```rust
//! use thumbprint_similarity::{best_matches, field_similarity};
//! use thumbprint_core::{record_from_json, TraitValue};
//! use serde_json::json;
//!
//! assert_eq!(field_similarity(&TraitValue::from("Intel i9"), &TraitValue::from("intel i9")), 1.0);
//!
//! let pool = vec![
//!     record_from_json(json!({"id": "u1", "os": "Windows 11", "cats": 3})).unwrap(),
//!     record_from_json(json!({"id": "u2", "os": "Arch Linux", "cats": 12})).unwrap(),
//! ];
//! let query = pool[1].clone();
//!
//! let results = best_matches(&query, &pool, 1);
//! assert_eq!(results[0].id(), Some("u2"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│  Distance   │────>│  Weights    │
//! │  (record)   │     │ (per field) │     │  (blend)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                        │
//!       │              ┌─────────────┐           │
//!       └─────────────>│  Matcher    │<──────────┘
//!                      │ (top-K)     │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Explain    │
//!                      │  (results)  │
//!                      └─────────────┘
//! ```

pub mod distance;
pub mod weights;
pub mod matcher;
pub mod explain;

// Re-export main types for convenience
pub use distance::{
    field_similarity,
    jaccard,
    number_similarity,
    text_similarity,
    sequence_similarity,
    NUMERIC_SCALE,
    SUBSTRING_SCORE,
};
pub use weights::{BlendWeights, WeightsError};
pub use matcher::{Matcher, MatchResult, MatchSignals, best_matches};
pub use explain::{ExplainedMatch, MatchSummary};
