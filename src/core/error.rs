//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors
///
/// Every variant aborts the run before anything is emitted; there is no
/// partial-success mode.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Pipeline file does not exist: {}", .0.display())]
    MissingPipelineFile(PathBuf),

    #[error("Invalid instance size: {size}. Choose from [{}]", .valid.join(", "))]
    UnknownInstanceSize { size: String, valid: Vec<String> },

    #[error("Instance size '{size}' has no queue configured; set {env_var}")]
    UnconfiguredQueue { size: String, env_var: String },

    #[error("Required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Base step template must be a JSON object: {}", .0.display())]
    InvalidBaseStep(PathBuf),

    #[error("No docker plugin slot to write image '{0}' into; the base template must provide one")]
    MissingDockerPlugin(String),
}
