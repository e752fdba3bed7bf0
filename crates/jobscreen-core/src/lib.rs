//! JobScreen Core
//!
//! Core types and utilities shared across JobScreen components.
//!
//! This crate provides:
//! - The job posting input and the prediction result types
//! - Decision thresholds and their startup validation
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    InferenceOutcome, InsufficientData, JobPosting, Prediction, PredictionLabel,
    PredictionReport, Thresholds,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        InferenceOutcome, JobPosting, Prediction, PredictionLabel, PredictionReport, Thresholds,
    };
}
