//! JobScreen Classifiers
//!
//! Text preprocessing and model inference for fraudulent posting detection:
//! - [`Vocabulary`] turns text into vocabulary indices
//! - [`pad_sequence`] / [`PadConfig`] fix the sequence length
//! - [`LstmClassifier`] runs the embedding + LSTM network with Candle
//!
//! Artifacts are loaded once at startup through [`load_artifacts`] and are
//! read-only afterwards.

pub mod classifier;
pub mod config;
pub mod lstm;
pub mod model_loader;
pub mod padding;
pub mod vocabulary;

pub use classifier::SequenceClassifier;
pub use config::{ArtifactConfig, ArtifactSourceSpec, DeviceSpec};
pub use lstm::{LstmClassifier, LstmDims};
pub use model_loader::{load_artifacts, ArtifactSource, DeviceType, LoadedArtifacts};
pub use padding::{pad_sequence, PadConfig, Truncating, DEFAULT_MAX_LEN, PAD_INDEX};
pub use vocabulary::{TokenizerRules, Vocabulary, DEFAULT_OOV_TOKEN};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::SequenceClassifier;
    pub use crate::lstm::{LstmClassifier, LstmDims};
    pub use crate::padding::{pad_sequence, PadConfig};
    pub use crate::vocabulary::Vocabulary;
}
