//! Sequence classifier trait

use async_trait::async_trait;
use jobscreen_core::Result;

/// A frozen scoring function over padded index sequences.
///
/// Implementations must be deterministic for the same input and must not
/// mutate internal state, so one instance can serve concurrent requests.
#[async_trait]
pub trait SequenceClassifier: Send + Sync {
    /// Probability in [0, 1] that the sequence belongs to the positive class
    async fn score(&self, ids: &[u32]) -> Result<f32>;

    /// Get the classifier name
    fn name(&self) -> &str;
}
