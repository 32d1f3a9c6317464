//! Blend weights
//!
//! How much each similarity signal contributes to a candidate's final score.
//! The thumbmark is the most specific whole-identity signal and dominates by
//! default; field and token scores corroborate it.

use serde::{Deserialize, Serialize};

/// Weights for the three ranking signals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlendWeights {
    /// Weight of the thumbmark comparison
    #[serde(default = "default_thumbmark")]
    pub thumbmark: f32,

    /// Weight of the averaged per-field similarity
    #[serde(default = "default_field")]
    pub field: f32,

    /// Weight of the flattened-token Jaccard fallback
    #[serde(default = "default_token")]
    pub token: f32,
}

fn default_thumbmark() -> f32 {
    0.7
}

fn default_field() -> f32 {
    0.2
}

fn default_token() -> f32 {
    0.1
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            thumbmark: default_thumbmark(),
            field: default_field(),
            token: default_token(),
        }
    }
}

impl BlendWeights {
    pub fn new(thumbmark: f32, field: f32, token: f32) -> Self {
        Self { thumbmark, field, token }
    }

    /// Validate the weights
    /// - Checks that weights are non-negative
    /// - Normalizes weights to sum to 1.0 if they don't
    pub fn validate_and_normalize(&mut self) -> Result<(), WeightsError> {
        for (name, weight) in [
            ("thumbmark", self.thumbmark),
            ("field", self.field),
            ("token", self.token),
        ] {
            if weight.is_nan() || weight.is_infinite() {
                return Err(WeightsError::NonFiniteWeight(name.to_string()));
            }
            if weight < 0.0 {
                return Err(WeightsError::NegativeWeight(name.to_string()));
            }
        }

        let weight_sum = self.thumbmark + self.field + self.token;
        if weight_sum <= 0.0 {
            return Err(WeightsError::ZeroTotalWeight);
        }

        if (weight_sum - 1.0).abs() > 0.001 {
            self.thumbmark /= weight_sum;
            self.field /= weight_sum;
            self.token /= weight_sum;
        }

        Ok(())
    }

    /// Weighted sum of the three signals
    #[inline]
    pub fn blend(&self, thumbmark: f32, field: f32, token: f32) -> f32 {
        thumbmark * self.thumbmark + field * self.field + token * self.token
    }
}

/// Errors that can occur during weight validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum WeightsError {
    #[error("Signal '{0}' has negative weight")]
    NegativeWeight(String),

    #[error("Signal '{0}' has a non-finite weight")]
    NonFiniteWeight(String),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,
}
