//! JobScreen Policy
//!
//! Turns classifier output into decisions and runs the end-to-end
//! screening pipeline.
//!
//! - [`DecisionPolicy`] maps a probability to LIKELY_REAL / SUSPICIOUS / FAKE
//!   using two ordered thresholds
//! - [`InferenceService`] validates a posting and runs
//!   encode → pad → score → decide

pub mod decision;
pub mod service;

pub use decision::{reason_for, DecisionPolicy};
pub use service::{
    InferenceService, ServiceSettings, DEFAULT_MIN_TEXT_CHARS, INSUFFICIENT_DATA_MESSAGE,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::decision::DecisionPolicy;
    pub use crate::service::{InferenceService, ServiceSettings};
}
