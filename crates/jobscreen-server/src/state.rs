//! Shared application state

use anyhow::Context;
use jobscreen_classifiers::{load_artifacts, SequenceClassifier};
use jobscreen_policy::InferenceService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Read-only inference context
    pub service: Arc<InferenceService>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,

    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        service: Arc<InferenceService>,
        metrics_handle: PrometheusHandle,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            service,
            metrics_handle,
            max_body_bytes,
        }
    }

    /// Load artifacts and build the inference service.
    ///
    /// Any failure here is fatal: the server must not bind without a model.
    pub async fn from_config(
        config: &ServerConfig,
        metrics_handle: PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let artifact_config = config.artifacts.clone();

        // Disk reads, hub downloads and weight mapping are blocking
        let artifacts = tokio::task::spawn_blocking(move || load_artifacts(&artifact_config))
            .await
            .context("artifact loading task panicked")?
            .context("failed to load model artifacts")?;

        info!(
            "Loaded vocabulary ({} words) and classifier '{}'",
            artifacts.vocabulary.len(),
            artifacts.classifier.name()
        );

        let service = InferenceService::from_artifacts(artifacts, config.settings())?;

        Ok(Self::new(
            Arc::new(service),
            metrics_handle,
            config.max_body_bytes,
        ))
    }
}
