//! Inference service
//!
//! The immutable context built once at startup and shared by every request:
//! validate → encode → pad → score → decide.

use crate::decision::DecisionPolicy;
use jobscreen_classifiers::{LoadedArtifacts, PadConfig, SequenceClassifier, Vocabulary};
use jobscreen_core::{Error, InferenceOutcome, JobPosting, PredictionReport, Result, Thresholds};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum combined posting length, in characters
pub const DEFAULT_MIN_TEXT_CHARS: usize = 30;

/// Guidance returned when a posting is too short to analyse
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Please provide proper job title and description for analysis.";

/// Startup settings for the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub padding: PadConfig,
    pub min_text_chars: usize,
    pub thresholds: Thresholds,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            padding: PadConfig::default(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            thresholds: Thresholds::default(),
        }
    }
}

impl ServiceSettings {
    pub fn with_padding(mut self, padding: PadConfig) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Reject settings the classifier cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.padding.max_len == 0 {
            return Err(Error::config("max_len must be greater than zero"));
        }
        self.thresholds.validate()
    }
}

/// Shared, read-only inference context
pub struct InferenceService {
    vocabulary: Arc<Vocabulary>,
    classifier: Arc<dyn SequenceClassifier>,
    policy: DecisionPolicy,
    settings: ServiceSettings,
}

impl InferenceService {
    /// Create a service from an already loaded vocabulary and classifier
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        classifier: Arc<dyn SequenceClassifier>,
        settings: ServiceSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let policy = DecisionPolicy::new(settings.thresholds)?;

        info!(
            "Inference service ready: classifier={} max_len={} min_chars={} thresholds={:?}",
            classifier.name(),
            settings.padding.max_len,
            settings.min_text_chars,
            settings.thresholds
        );

        Ok(Self {
            vocabulary,
            classifier,
            policy,
            settings,
        })
    }

    /// Create a service from startup artifacts
    pub fn from_artifacts(artifacts: LoadedArtifacts, settings: ServiceSettings) -> Result<Self> {
        Self::new(artifacts.vocabulary, artifacts.classifier, settings)
    }

    /// Screen a posting.
    ///
    /// Too-short input returns [`InferenceOutcome::InsufficientData`] and the
    /// classifier is not called. `Err` is reserved for classifier failures.
    pub async fn infer(&self, posting: &JobPosting) -> Result<InferenceOutcome> {
        metrics::counter!("jobscreen_requests_total").increment(1);

        let text = posting.combined_text();
        let chars = text.chars().count();
        if chars < self.settings.min_text_chars {
            debug!(
                "Posting too short: {} chars (minimum {})",
                chars, self.settings.min_text_chars
            );
            metrics::counter!("jobscreen_insufficient_data_total").increment(1);
            return Ok(InferenceOutcome::insufficient(INSUFFICIENT_DATA_MESSAGE));
        }

        let start = Instant::now();
        let ids = self.prepare(&text);

        let scored = self.classifier.score(&ids).await;
        let probability = match scored.and_then(check_probability) {
            Ok(p) => p,
            Err(e) => {
                warn!("Classifier '{}' failed: {}", self.classifier.name(), e);
                metrics::counter!("jobscreen_errors_total", "type" => "classifier").increment(1);
                return Err(e);
            }
        };

        let prediction = self.policy.decide(probability);
        let elapsed_us = start.elapsed().as_micros() as u64;

        metrics::histogram!("jobscreen_inference_latency_us").record(elapsed_us as f64);
        metrics::counter!("jobscreen_predictions_total", "label" => prediction.label.as_str())
            .increment(1);
        debug!(
            "Scored posting: p={:.6} label={} in {}us",
            probability, prediction.label, elapsed_us
        );

        Ok(InferenceOutcome::Prediction(PredictionReport::new(
            prediction,
            self.settings.thresholds,
        )))
    }

    /// Encode and pad text to the classifier's input length
    pub fn prepare(&self, text: &str) -> Vec<u32> {
        self.settings.padding.apply(&self.vocabulary.encode(text))
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn thresholds(&self) -> Thresholds {
        self.settings.thresholds
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

/// NaN would otherwise fall through every threshold into the least severe band
fn check_probability(probability: f32) -> Result<f32> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(Error::classifier(format!(
            "classifier returned {} instead of a probability in [0, 1]",
            probability
        )))
    }
}
