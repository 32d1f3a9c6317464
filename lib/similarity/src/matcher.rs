//! Candidate matcher
//!
//! Scores every candidate in a pool against a query identity by blending
//! three signals, then returns the top-K with a per-field breakdown.

use crate::distance::{field_similarity, jaccard};
use crate::weights::{BlendWeights, WeightsError};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use thumbprint_core::{flatten, record_thumbmark, thumbmark_similarity, TraitRecord};

/// Pools smaller than this are scored on the calling thread
const PARALLEL_THRESHOLD: usize = 256;

/// Unweighted signal scores, each in [0.0, 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MatchSignals {
    pub thumbmark: f32,
    pub field: f32,
    pub token: f32,
}

/// A ranked candidate
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// The candidate record, unchanged
    pub candidate: TraitRecord,
    /// Blended similarity score
    pub score: f32,
    /// Per-field similarity for keys present in both query and candidate
    pub breakdown: IndexMap<String, f32>,
    /// The signals the score was blended from
    pub signals: MatchSignals,
}

impl MatchResult {
    /// The candidate's `id` field, if it is a string
    pub fn id(&self) -> Option<&str> {
        self.candidate.get("id").and_then(|v| v.as_str())
    }
}

/// Query-side values computed once per ranking call
struct PreparedQuery<'a> {
    record: &'a TraitRecord,
    tokens: Vec<String>,
    thumbmark: String,
}

/// Ranks candidate identities against a query
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    weights: BlendWeights,
}

impl Matcher {
    /// Create a matcher after validating and normalizing the weights.
    /// [`Matcher::default`] uses the default blend.
    pub fn try_new(mut weights: BlendWeights) -> Result<Self, WeightsError> {
        weights.validate_and_normalize()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &BlendWeights {
        &self.weights
    }

    /// Rank `pool` against `query` and return the best `top_k` matches
    ///
    /// Sorted by score descending; ties keep pool order. An empty pool or a
    /// `top_k` of zero yields no results. Inputs are never modified.
    pub fn best_matches(
        &self,
        query: &TraitRecord,
        pool: &[TraitRecord],
        top_k: usize,
    ) -> Vec<MatchResult> {
        if top_k == 0 || pool.is_empty() {
            return Vec::new();
        }

        let prepared = PreparedQuery {
            record: query,
            tokens: flatten(query),
            thumbmark: record_thumbmark(query),
        };

        let score_one = |(idx, candidate): (usize, &TraitRecord)| {
            let (score, signals, breakdown) = self.score_prepared(&prepared, candidate);
            (idx, score, signals, breakdown)
        };

        let mut scored: Vec<_> = if pool.len() >= PARALLEL_THRESHOLD {
            pool.par_iter().enumerate().map(score_one).collect()
        } else {
            pool.iter().enumerate().map(score_one).collect()
        };

        // Stable sort keeps pool order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(idx, score, signals, breakdown)| MatchResult {
                candidate: pool[idx].clone(),
                score,
                breakdown,
                signals,
            })
            .collect()
    }

    /// Score a single candidate against a query
    ///
    /// Returns (blended_score, signals, breakdown).
    pub fn score(
        &self,
        query: &TraitRecord,
        candidate: &TraitRecord,
    ) -> (f32, MatchSignals, IndexMap<String, f32>) {
        let prepared = PreparedQuery {
            record: query,
            tokens: flatten(query),
            thumbmark: record_thumbmark(query),
        };
        self.score_prepared(&prepared, candidate)
    }

    fn score_prepared(
        &self,
        query: &PreparedQuery<'_>,
        candidate: &TraitRecord,
    ) -> (f32, MatchSignals, IndexMap<String, f32>) {
        let mut breakdown = IndexMap::new();
        for (key, query_value) in query.record {
            if let Some(candidate_value) = candidate.get(key) {
                breakdown.insert(key.clone(), field_similarity(query_value, candidate_value));
            }
        }

        let field = if breakdown.is_empty() {
            0.0
        } else {
            breakdown.values().sum::<f32>() / breakdown.len() as f32
        };

        let token = jaccard(&query.tokens, &flatten(candidate));
        let thumbmark = thumbmark_similarity(&query.thumbmark, &record_thumbmark(candidate));

        let signals = MatchSignals { thumbmark, field, token };
        let score = self.weights.blend(thumbmark, field, token).clamp(0.0, 1.0);
        (score, signals, breakdown)
    }
}

/// Rank `pool` against `query` with the default blend weights
pub fn best_matches(query: &TraitRecord, pool: &[TraitRecord], top_k: usize) -> Vec<MatchResult> {
    Matcher::default().best_matches(query, pool, top_k)
}
