//! Core domain models for pipeline generation
//!
//! This module defines the step data model and the small transformations
//! (condition filtering, deep merge, queue resolution) that the assembler
//! composes into a run.

pub mod condition;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod queue;
pub mod step;

pub use condition::ConditionFilter;
pub use config::EnvConfig;
pub use error::ConfigError;
pub use pipeline::PipelineFile;
pub use queue::QueueMap;
pub use step::Step;
