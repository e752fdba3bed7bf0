//! Configuration for artifact loading

use crate::lstm::LstmDims;
use crate::{ArtifactSource, DeviceType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to find the model and vocabulary, and how to run them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Safetensors weights of the LSTM network
    #[serde(default = "default_model")]
    pub model: ArtifactSourceSpec,

    /// Tokenizer JSON export
    #[serde(default = "default_vocabulary")]
    pub vocabulary: ArtifactSourceSpec,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Layer sizes of the exported network
    #[serde(default)]
    pub dims: LstmDims,
}

/// Artifact source specification (for config files)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactSourceSpec {
    /// Local file path
    Local { path: PathBuf },

    /// Hugging Face Hub
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },
}

/// Device specification (for config files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda { index: Option<usize> },
    Metal { index: Option<usize> },
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            vocabulary: default_vocabulary(),
            device: DeviceSpec::Cpu,
            dims: LstmDims::default(),
        }
    }
}

impl ArtifactConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Point both artifacts at local files
    pub fn local(model: impl Into<PathBuf>, vocabulary: impl Into<PathBuf>) -> Self {
        Self {
            model: ArtifactSourceSpec::Local { path: model.into() },
            vocabulary: ArtifactSourceSpec::Local {
                path: vocabulary.into(),
            },
            ..Default::default()
        }
    }

    pub fn with_dims(mut self, dims: LstmDims) -> Self {
        self.dims = dims;
        self
    }
}

impl ArtifactSourceSpec {
    /// Convert to the runtime source
    pub fn to_source(&self) -> ArtifactSource {
        match self {
            Self::Local { path } => ArtifactSource::LocalPath(path.clone()),
            Self::HuggingFace {
                repo_id,
                filename,
                revision,
            } => ArtifactSource::HuggingFace {
                repo_id: repo_id.clone(),
                revision: revision.clone(),
                filename: filename.clone(),
            },
        }
    }
}

impl DeviceSpec {
    /// Convert to DeviceType
    pub fn to_device_type(&self) -> DeviceType {
        match self {
            DeviceSpec::Cpu => DeviceType::Cpu,
            DeviceSpec::Cuda { index } => DeviceType::Cuda(index.unwrap_or(0)),
            DeviceSpec::Metal { index } => DeviceType::Metal(index.unwrap_or(0)),
        }
    }
}

fn default_model() -> ArtifactSourceSpec {
    ArtifactSourceSpec::Local {
        path: PathBuf::from("./saved_model/fake_job_lstm.safetensors"),
    }
}

fn default_vocabulary() -> ArtifactSourceSpec {
    ArtifactSourceSpec::Local {
        path: PathBuf::from("./saved_model/tokenizer.json"),
    }
}
