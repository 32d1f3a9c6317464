//! Similarity functions for trait values
//!
//! Per-field comparison dispatched on the value's variant, plus set Jaccard
//! over flattened tokens. All functions return a score in [0.0, 1.0] where
//! 1.0 means identical, and never fail: incomparable inputs score 0.

use ahash::AHashSet;
use thumbprint_core::TraitValue;

/// Numeric differences are normalized against this scale
pub const NUMERIC_SCALE: f64 = 10.0;

/// Score for strings where one contains the other (case-insensitive)
pub const SUBSTRING_SCORE: f32 = 0.6;

/// Calculate similarity between two trait values
///
/// The first matching rule wins:
/// 1. both numbers: linear decay over [`NUMERIC_SCALE`]
/// 2. either side a sequence: Jaccard over both sides as sets, a scalar side
///    counting as a singleton
/// 3. both strings: case-insensitive exact (1.0) or containment ([`SUBSTRING_SCORE`])
/// 4. otherwise structural equality; mismatched variants (number vs string) score 0
pub fn field_similarity(a: &TraitValue, b: &TraitValue) -> f32 {
    match (a, b) {
        (TraitValue::Number(x), TraitValue::Number(y)) => number_similarity(*x, *y),
        (TraitValue::Sequence(_), _) | (_, TraitValue::Sequence(_)) => {
            sequence_similarity(as_items(a), as_items(b))
        }
        (TraitValue::String(x), TraitValue::String(y)) => text_similarity(x, y),
        _ => {
            if a == b { 1.0 } else { 0.0 }
        }
    }
}

/// Linear decay: `max(0, 1 - |a - b| / 10)`
pub fn number_similarity(a: f64, b: f64) -> f32 {
    let diff = (a - b).abs();
    let sim = (1.0 - diff / NUMERIC_SCALE).max(0.0);
    if sim.is_nan() { 0.0 } else { sim as f32 }
}

/// Case-insensitive exact match or containment
pub fn text_similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        1.0
    } else if a.contains(&b) || b.contains(&a) {
        SUBSTRING_SCORE
    } else {
        0.0
    }
}

fn as_items(value: &TraitValue) -> &[TraitValue] {
    match value {
        TraitValue::Sequence(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Collapse duplicates by structural equality, keeping first occurrences
fn distinct(items: &[TraitValue]) -> Vec<&TraitValue> {
    let mut out: Vec<&TraitValue> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Jaccard index of two value sequences treated as sets
pub fn sequence_similarity(a: &[TraitValue], b: &[TraitValue]) -> f32 {
    let set_a = distinct(a);
    let set_b = distinct(b);

    let intersection = set_a.iter().filter(|x| set_b.contains(*x)).count();
    let union = set_a.len() + set_b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Jaccard index between token sets; 0 when both are empty
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f32 {
    let set_a: AHashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: AHashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}
