//! Explainability for ranking results
//!
//! Output structures that show how a candidate's score was reached: the
//! blended score, the unweighted signals and the per-field breakdown.

use crate::matcher::{MatchResult, MatchSignals};
use indexmap::IndexMap;
use serde::Serialize;
use thumbprint_core::{record_thumbmark, TraitRecord};

/// A ranked candidate with its score explanation
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedMatch {
    /// Candidate `id`, when the record carries a string id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Blended similarity score
    pub score: f32,
    /// The candidate's thumbmark (own or derived)
    pub thumbmark: String,
    /// Per-field similarity for shared keys
    pub breakdown: IndexMap<String, f32>,
    /// Unweighted signal scores
    pub signals: MatchSignals,
    /// The candidate record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<TraitRecord>,
}

impl ExplainedMatch {
    /// Create an explained match from a ranked result
    pub fn from_match(result: MatchResult, include_record: bool) -> Self {
        Self {
            id: result.id().map(String::from),
            score: result.score,
            thumbmark: record_thumbmark(&result.candidate),
            breakdown: result.breakdown,
            signals: result.signals,
            user: if include_record { Some(result.candidate) } else { None },
        }
    }

    pub fn from_match_list(results: Vec<MatchResult>, include_record: bool) -> Vec<Self> {
        results
            .into_iter()
            .map(|r| Self::from_match(r, include_record))
            .collect()
    }
}

/// Summary statistics for a ranking call
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    /// Number of candidates considered
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average score of results
    pub avg_score: f32,
    /// Score of best result
    pub best_score: f32,
    /// Field with the highest similarity in the best result
    pub top_contributing_field: Option<String>,
}

impl MatchSummary {
    /// Compute stats from ranked results (sorted best first)
    pub fn compute(results: &[MatchResult], candidates_count: usize) -> Self {
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_field: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;

        // First field wins on equal scores
        let mut top: Option<(&String, f32)> = None;
        for (field, score) in &best.breakdown {
            if top.map_or(true, |(_, s)| *score > s) {
                top = Some((field, *score));
            }
        }

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_field: top.map(|(f, _)| f.clone()),
        }
    }
}
