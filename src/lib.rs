//! pipeline-gen - generates Buildkite step lists from declarative YAML pipelines

pub mod assemble;
pub mod cli;
pub mod core;

// Re-export commonly used types
pub use assemble::{Assembler, EarlyFilter};
pub use core::{ConditionFilter, ConfigError, EnvConfig, PipelineFile, QueueMap, Step};
