//! Threshold decision policy
//!
//! Partitions the probability range into three bands. Each band includes its
//! lower bound, so a probability equal to a threshold lands in the more
//! severe band.

use jobscreen_core::{Prediction, PredictionLabel, Result, Thresholds};

pub const FAKE_REASON: &str = "high similarity with known scam patterns";
pub const SUSPICIOUS_REASON: &str = "generic language / easy-money keyword pattern detected";
pub const LIKELY_REAL_REASON: &str = "posting details appear professional and structured";

/// Maps a probability to a labeled decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    thresholds: Thresholds,
}

impl DecisionPolicy {
    /// Create a policy; rejects unordered or out-of-range thresholds
    pub fn new(thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Band for `probability`
    pub fn label_for(&self, probability: f32) -> PredictionLabel {
        if probability >= self.thresholds.fake {
            PredictionLabel::Fake
        } else if probability >= self.thresholds.suspicious {
            PredictionLabel::Suspicious
        } else {
            PredictionLabel::LikelyReal
        }
    }

    /// Decide on the unrounded probability
    pub fn decide(&self, probability: f32) -> Prediction {
        let label = self.label_for(probability);
        Prediction {
            probability,
            label,
            reason: reason_for(label).to_string(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
        }
    }
}

/// Explanation attached to each band
pub fn reason_for(label: PredictionLabel) -> &'static str {
    match label {
        PredictionLabel::Fake => FAKE_REASON,
        PredictionLabel::Suspicious => SUSPICIOUS_REASON,
        PredictionLabel::LikelyReal => LIKELY_REAL_REASON,
    }
}
