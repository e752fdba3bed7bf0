//! Server configuration

use clap::Parser;
use jobscreen_classifiers::{
    ArtifactConfig, ArtifactSourceSpec, PadConfig, Truncating, DEFAULT_MAX_LEN,
};
use jobscreen_core::Thresholds;
use jobscreen_policy::{ServiceSettings, DEFAULT_MIN_TEXT_CHARS};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[command(name = "jobscreen-server")]
#[command(about = "Fake job posting detection API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Model weights (safetensors), overrides the config file
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Tokenizer JSON export, overrides the config file
    #[arg(long)]
    pub vocabulary: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Model and vocabulary locations
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Preprocessing knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    #[serde(default)]
    pub truncating: Truncating,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Missing file means defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(cli);
        config.settings().validate()?;

        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// CLI flags win over file values
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.artifacts.model = ArtifactSourceSpec::Local { path: model.clone() };
        }

        if let Some(vocabulary) = &cli.vocabulary {
            self.artifacts.vocabulary = ArtifactSourceSpec::Local {
                path: vocabulary.clone(),
            };
        }

        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }
    }

    /// Pipeline settings handed to the inference service
    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings::default()
            .with_padding(
                PadConfig::new(self.pipeline.max_len).with_truncating(self.pipeline.truncating),
            )
            .with_min_text_chars(self.pipeline.min_text_chars)
            .with_thresholds(self.thresholds)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            artifacts: ArtifactConfig::default(),
            pipeline: PipelineConfig::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            min_text_chars: default_min_text_chars(),
            truncating: Truncating::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

fn default_min_text_chars() -> usize {
    DEFAULT_MIN_TEXT_CHARS
}
