//! # thumbprint
//!
//! A browser fingerprint simulator: flatten schema-less identity records,
//! derive a deterministic thumbmark, rank candidate identities against a
//! query and explain how a fingerprint changed between sessions.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! thumbprint --http-port 5173 --data-dir ./data
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use thumbprint::prelude::*;
//! use serde_json::json;
//!
//! let pool = vec![
//!     record_from_json(json!({"id": "u1", "os": "Windows 11", "gpu": "RTX 3060"})).unwrap(),
//!     record_from_json(json!({"id": "u2", "os": "Arch Linux", "gpu": "RX 7900"})).unwrap(),
//! ];
//! let query = record_from_json(json!({"os": "Arch Linux", "gpu": "RX 7900"})).unwrap();
//!
//! let results = Matcher::default().best_matches(&query, &pool, 1);
//! assert_eq!(results[0].id(), Some("u2"));
//! assert_eq!(compute_thumbmark(&query).len(), THUMBMARK_LEN);
//! ```
//!
//! ## Crate Structure
//!
//! - `thumbprint-core` - Trait values, flattening, thumbmarks, observations
//! - `thumbprint-similarity` - Field/token similarity, blended ranking, explanations
//! - `thumbprint-storage` - Visit registry with JSON snapshot persistence
//! - `thumbprint-api` - REST endpoints

// Re-export core types
pub use thumbprint_core::{
    TraitValue, TraitRecord, record_from_json,
    flatten, try_flatten, compute_thumbmark, try_compute_thumbmark, record_thumbmark,
    thumbmark_similarity, THUMBMARK_LEN,
    SafeFingerprint, StoredFingerprint, RecognitionMeta,
    Observation, observe, build_observations,
    ensure_identity, estimate_uniqueness, generate_synthetic_identities,
    Error, Result,
};

// Re-export similarity
pub use thumbprint_similarity::{
    BlendWeights, Matcher, MatchResult, MatchSignals, ExplainedMatch, MatchSummary, best_matches,
};

// Re-export storage
pub use thumbprint_storage::{StorageManager, RegistryConfig, FingerprintRegistry};

// Re-export API
pub use thumbprint_api::{RestApi, ApiConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        TraitValue, TraitRecord, record_from_json,
        flatten, compute_thumbmark, record_thumbmark, THUMBMARK_LEN,
        StoredFingerprint, RecognitionMeta, build_observations,
        BlendWeights, Matcher, MatchResult, ExplainedMatch, best_matches,
        StorageManager, RegistryConfig,
        Error, Result,
    };
}
