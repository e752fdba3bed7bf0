//! Artifact resolution and startup loading for the classifier and vocabulary

use crate::config::ArtifactConfig;
use crate::lstm::{LstmClassifier, LstmDims};
use crate::vocabulary::Vocabulary;
use candle_core::Device;
use hf_hub::{api::sync::Api, Repo, RepoType};
use jobscreen_core::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Source location for an artifact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

/// Vocabulary and classifier loaded once at startup
#[derive(Clone)]
pub struct LoadedArtifacts {
    pub vocabulary: Arc<Vocabulary>,
    pub classifier: Arc<LstmClassifier>,
}

/// Resolve, load and cross-check both artifacts.
///
/// Any failure here is fatal for the caller: a service must not start
/// without a vocabulary and a classifier that agree on the embedding size.
pub fn load_artifacts(config: &ArtifactConfig) -> Result<LoadedArtifacts> {
    let vocabulary_path = resolve_artifact_path(&config.vocabulary.to_source())?;
    info!("Loading vocabulary from {}", vocabulary_path.display());
    let vocabulary = Vocabulary::from_file(&vocabulary_path)?;
    info!(
        "Vocabulary loaded: {} entries, num_words={:?}",
        vocabulary.len(),
        vocabulary.num_words()
    );

    check_compatible(&vocabulary, config.dims)?;

    let model_path = resolve_artifact_path(&config.model.to_source())?;
    let device = create_device(config.device.to_device_type())?;
    let classifier = LstmClassifier::load(&model_path, config.dims, &device)?;

    Ok(LoadedArtifacts {
        vocabulary: Arc::new(vocabulary),
        classifier: Arc::new(classifier),
    })
}

/// Every index the encoder can emit must have an embedding row
fn check_compatible(vocabulary: &Vocabulary, dims: LstmDims) -> Result<()> {
    let max_index = vocabulary.max_encoded_index() as usize;
    if max_index >= dims.vocab_size {
        return Err(Error::artifact(format!(
            "vocabulary emits index {} but the embedding table has {} rows",
            max_index, dims.vocab_size
        )));
    }
    Ok(())
}

/// Resolve artifact path from source
pub fn resolve_artifact_path(source: &ArtifactSource) -> Result<PathBuf> {
    match source {
        ArtifactSource::LocalPath(path) => {
            if !path.exists() {
                return Err(Error::artifact(format!(
                    "Artifact file not found: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ArtifactSource::HuggingFace {
            repo_id,
            revision,
            filename,
        } => {
            info!("Fetching {} from Hugging Face repo {}", filename, repo_id);
            let api = Api::new()
                .map_err(|e| Error::artifact(format!("Failed to initialize HF API: {}", e)))?;

            let repo = api.repo(Repo::with_revision(
                repo_id.clone(),
                RepoType::Model,
                revision.clone().unwrap_or_else(|| "main".to_string()),
            ));

            repo.get(filename).map_err(|e| {
                Error::artifact(format!("Failed to download {} from HF: {}", filename, e))
            })
        }
    }
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::artifact(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::artifact(format!("Failed to create Metal device: {}", e))),
    }
}
