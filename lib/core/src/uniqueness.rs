//! Heuristic uniqueness estimate for a trait set
//!
//! Adds fixed rarity points for uncommon platforms, browsers, hardware,
//! resolutions and large font sets, then buckets the total into a label.

use crate::fingerprint::SafeFingerprint;
use serde::{Deserialize, Serialize};

const MAX_SCORE: f64 = 99.99;
const COMMON_RESOLUTIONS: [&str; 3] = ["1920x1080", "1366x768", "1440x900"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessEstimate {
    pub score: f64,
    pub label: String,
    pub one_in: String,
}

pub fn estimate_uniqueness(traits: &SafeFingerprint, font_count: usize) -> UniquenessEstimate {
    let mut score = 10.0;

    let platform = traits.platform.as_deref().unwrap_or("");
    if platform.contains("Linux") {
        score += 40.0;
    } else if platform.contains("Mac") {
        score += 10.0;
    } else if platform.contains("Win") {
        score += 5.0;
    }

    let user_agent = traits.user_agent.as_deref().unwrap_or("");
    if user_agent.contains("Firefox") {
        score += 15.0;
    } else if user_agent.contains("Edge") {
        score += 10.0;
    }

    if traits.hardware_concurrency.unwrap_or(4) > 8 {
        score += 15.0;
    }
    if traits.device_memory.unwrap_or(4.0) >= 16.0 {
        score += 15.0;
    }

    if !COMMON_RESOLUTIONS.contains(&traits.resolution().as_str()) {
        score += 20.0;
    }

    if font_count > 10 {
        score += 20.0;
    }
    if font_count > 20 {
        score += 20.0;
    }

    let score = f64::min(MAX_SCORE, score);
    let (label, one_in) = if score > 90.0 {
        ("Very Unique", "1 in 10,000+")
    } else if score > 70.0 {
        ("Distinct", "1 in 1,000")
    } else if score > 40.0 {
        ("Moderately Unique", "1 in 250")
    } else {
        ("Common", "1 in 50")
    };

    UniquenessEstimate {
        score,
        label: label.to_string(),
        one_in: one_in.to_string(),
    }
}
