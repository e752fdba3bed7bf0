//! Fixed-length sequence padding

use serde::{Deserialize, Serialize};

/// Value appended after the real tokens
pub const PAD_INDEX: u32 = 0;

/// Sequence length the classifier was trained with
pub const DEFAULT_MAX_LEN: usize = 300;

/// Which end of an over-long sequence is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncating {
    /// Drop leading tokens, keep the last `max_len`
    Pre,
    /// Drop trailing tokens, keep the first `max_len`
    #[default]
    Post,
}

/// Padding settings applied before every classifier call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    #[serde(default)]
    pub truncating: Truncating,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            truncating: Truncating::Post,
        }
    }
}

impl PadConfig {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            ..Default::default()
        }
    }

    pub fn with_truncating(mut self, truncating: Truncating) -> Self {
        self.truncating = truncating;
        self
    }

    /// Bring `sequence` to exactly `max_len` values
    pub fn apply(&self, sequence: &[u32]) -> Vec<u32> {
        match self.truncating {
            Truncating::Post => pad_sequence(sequence, self.max_len),
            Truncating::Pre => {
                let start = sequence.len().saturating_sub(self.max_len);
                pad_sequence(&sequence[start..], self.max_len)
            }
        }
    }
}

/// Keep the first `len` values and append [`PAD_INDEX`] up to `len`.
pub fn pad_sequence(sequence: &[u32], len: usize) -> Vec<u32> {
    let keep = sequence.len().min(len);
    let mut padded = Vec::with_capacity(len);
    padded.extend_from_slice(&sequence[..keep]);
    padded.resize(len, PAD_INDEX);
    padded
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}
