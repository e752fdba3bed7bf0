//! JobScreen Server
//!
//! Thin axum adapter over [`jobscreen_policy::InferenceService`]: loads the
//! model artifacts once at startup and serves `POST /predict`.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{Cli, PipelineConfig, ServerConfig};
pub use routes::{create_router, AppError};
pub use state::AppState;
