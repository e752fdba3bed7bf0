//! Core types for JobScreen

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Decimal places kept in the reported probability
pub const PROBABILITY_DECIMALS: i32 = 4;

/// A job posting submitted for screening
///
/// Every field is optional on the wire and defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub title: String,
    pub company_profile: String,
    pub description: String,
    pub requirements: String,
    pub benefits: String,
}

impl JobPosting {
    /// Create an empty posting
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the company profile
    pub fn with_company_profile(mut self, company_profile: impl Into<String>) -> Self {
        self.company_profile = company_profile.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the requirements
    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }

    /// Set the benefits
    pub fn with_benefits(mut self, benefits: impl Into<String>) -> Self {
        self.benefits = benefits.into();
        self
    }

    /// Fields in the order the model was trained on
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.title,
            &self.company_profile,
            &self.description,
            &self.requirements,
            &self.benefits,
        ]
    }

    /// Trim every field and join them with single spaces.
    ///
    /// Empty fields still contribute their separator, so five empty fields
    /// produce four spaces.
    pub fn combined_text(&self) -> String {
        self.fields()
            .iter()
            .map(|field| field.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Three-way screening decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionLabel {
    LikelyReal,
    Suspicious,
    Fake,
}

impl PredictionLabel {
    /// Wire name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LikelyReal => "LIKELY_REAL",
            Self::Suspicious => "SUSPICIOUS",
            Self::Fake => "FAKE",
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered decision thresholds, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Lower bound (inclusive) of the SUSPICIOUS band
    pub suspicious: f32,

    /// Lower bound (inclusive) of the FAKE band
    pub fake: f32,
}

impl Thresholds {
    /// Create validated thresholds
    pub fn new(suspicious: f32, fake: f32) -> Result<Self> {
        let thresholds = Self { suspicious, fake };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check `0 <= suspicious < fake <= 1`
    pub fn validate(&self) -> Result<()> {
        if !self.suspicious.is_finite() || !self.fake.is_finite() {
            return Err(Error::config("thresholds must be finite numbers"));
        }
        if self.suspicious < 0.0 || self.fake > 1.0 {
            return Err(Error::config(format!(
                "thresholds must lie within [0, 1], got suspicious={} fake={}",
                self.suspicious, self.fake
            )));
        }
        if self.suspicious >= self.fake {
            return Err(Error::config(format!(
                "suspicious threshold ({}) must be below fake threshold ({})",
                self.suspicious, self.fake
            )));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            suspicious: 0.15,
            fake: 0.50,
        }
    }
}

/// Decision produced from an unrounded probability
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Raw classifier output in [0, 1]
    pub probability: f32,

    /// Decision band
    pub label: PredictionLabel,

    /// Human-readable explanation of the band
    pub reason: String,
}

/// Prediction as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub prediction_label: PredictionLabel,

    /// Probability rounded to [`PROBABILITY_DECIMALS`] places
    pub fake_probability: f64,

    pub decision_reason: String,

    pub thresholds_used: Thresholds,
}

impl PredictionReport {
    /// Build the report for a decision made with `thresholds`
    pub fn new(prediction: Prediction, thresholds: Thresholds) -> Self {
        Self {
            prediction_label: prediction.label,
            fake_probability: round_probability(prediction.probability),
            decision_reason: prediction.reason,
            thresholds_used: thresholds,
        }
    }
}

/// Body returned when the posting is too short to analyse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientData {
    pub status: String,
    pub message: String,
}

impl InsufficientData {
    pub const STATUS: &'static str = "insufficient_data";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Self::STATUS.to_string(),
            message: message.into(),
        }
    }
}

/// Result of a single inference request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InferenceOutcome {
    /// The pipeline ran and produced a decision
    Prediction(PredictionReport),

    /// Input was rejected before reaching the classifier
    InsufficientData(InsufficientData),
}

impl InferenceOutcome {
    /// Shortcut for the validation outcome
    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData(InsufficientData::new(message))
    }

    /// Returns the report if the pipeline ran
    pub fn report(&self) -> Option<&PredictionReport> {
        match self {
            Self::Prediction(report) => Some(report),
            Self::InsufficientData(_) => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}

/// Round a probability for reporting. Never feeds back into a decision.
pub fn round_probability(probability: f32) -> f64 {
    let scale = 10f64.powi(PROBABILITY_DECIMALS);
    (f64::from(probability) * scale).round() / scale
}
