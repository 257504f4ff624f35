//! Pipeline assembly engine - orchestrates a full generation run

use crate::assemble::commands::{
    clean_repo_branch, create_setup_commands, inject_commands, map_commands, wrap_with_echo,
};
use crate::assemble::finalize::Finalizer;
use crate::core::condition::ConditionFilter;
use crate::core::config::EnvConfig;
use crate::core::error::ConfigError;
use crate::core::merge::deep_merge;
use crate::core::pipeline::PipelineFile;
use crate::core::queue::QueueMap;
use crate::core::step::Step;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Condition tag marking steps that can run before wheels are built
pub const EARLY_KICKOFF_CONDITION: &str = "NO_WHEELS_REQUIRED";

/// Step fields the base template must not overwrite when the step
/// declares them itself
pub const PROTECTED_MERGE_KEYS: [&str; 2] = ["timeout_in_minutes", "depends_on"];

/// Which phase of the pipeline this run emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarlyFilter {
    /// No phase filtering
    #[default]
    All,
    /// Only early kick-off steps; setup commands are prepended
    EarlyOnly,
    /// Everything except early kick-off steps
    NotEarlyOnly,
}

/// Assembles the emitted step list from a pipeline declaration.
///
/// One strictly sequential run: read, filter, merge, finalize, wrap,
/// serialize. Any error aborts before anything is emitted.
#[derive(Debug)]
pub struct Assembler {
    config: EnvConfig,
    queue: String,
    image: Option<String>,
    early: EarlyFilter,
}

impl Assembler {
    pub fn new(
        config: EnvConfig,
        queue: impl Into<String>,
        image: Option<String>,
        early: EarlyFilter,
    ) -> Self {
        Self {
            config,
            queue: queue.into(),
            image,
            early,
        }
    }

    /// Run a full assembly from files and serialize the result
    pub fn assemble(&self, pipeline_path: &Path, base_step_path: &Path) -> Result<String> {
        let base_step = load_base_step(base_step_path)?;
        let pipeline = PipelineFile::from_file(pipeline_path)?;

        let payload = self.assemble_steps(pipeline, &base_step)?;
        let serialized = serde_json::to_string(&payload)?;
        debug!(payload = %serialized, "Assembled step list");
        Ok(serialized)
    }

    /// Transform a parsed pipeline into the emitted JSON value
    pub fn assemble_steps(
        &self,
        pipeline: PipelineFile,
        base_step: &Map<String, Value>,
    ) -> Result<Value> {
        let mut steps = pipeline.steps;
        info!(steps = steps.len(), "Read pipeline declaration");

        // Early kick-off phase filtering
        steps = match self.early {
            EarlyFilter::All => steps,
            EarlyFilter::EarlyOnly => ConditionFilter::new()
                .include([EARLY_KICKOFF_CONDITION])
                .apply(&steps),
            EarlyFilter::NotEarlyOnly => ConditionFilter::new()
                .exclude([EARLY_KICKOFF_CONDITION])
                .apply(&steps),
        };

        // Affected-set filtering, unless the run-everything override is set
        if !self.config.all_tests {
            let include = self.config.affected_set_conditions();
            debug!(conditions = ?include, "Filtering by affected-set conditions");
            steps = ConditionFilter::new().include(include).apply(&steps);
        }
        info!(steps = steps.len(), "Steps remaining after filtering");

        // Merge the base template into every step; fields the step sets
        // itself win for the protected keys
        let protected: HashSet<&str> = PROTECTED_MERGE_KEYS.into_iter().collect();
        for step in &mut steps {
            deep_merge(step.map_mut(), base_step, &protected);
        }

        // Queue, image, artifact destination; strips internal-only keys
        let artifact_destination = self.config.artifact_destination()?;
        let queues = QueueMap::from_config(&self.config);
        let finalizer = Finalizer::new(
            &self.queue,
            self.image.as_deref(),
            &artifact_destination,
            &queues,
        );
        for step in &mut steps {
            finalizer.finalize(step)?;
        }

        // Progress echo before each real command
        map_commands(&mut steps, wrap_with_echo);

        // Early kick-off runs inside the previous image and must check out
        // the PR revision first
        if self.early == EarlyFilter::EarlyOnly {
            let setup = self.setup_commands()?;
            inject_commands(&mut steps, &setup, &[]);
        }

        Ok(emit(pipeline.group, steps))
    }

    fn setup_commands(&self) -> Result<Vec<String>, ConfigError> {
        let repo_url = self
            .config
            .pull_request_repo
            .as_deref()
            .ok_or(ConfigError::MissingEnv("BUILDKITE_PULL_REQUEST_REPO"))?;
        let branch = self
            .config
            .branch
            .as_deref()
            .ok_or(ConfigError::MissingEnv("BUILDKITE_BRANCH"))?;
        let commit = self
            .config
            .commit
            .as_deref()
            .ok_or(ConfigError::MissingEnv("BUILDKITE_COMMIT"))?;
        Ok(create_setup_commands(
            repo_url,
            &clean_repo_branch(branch),
            commit,
        ))
    }
}

fn load_base_step(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read base step template: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Base step template is not valid JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::InvalidBaseStep(path.to_path_buf()).into()),
    }
}

fn emit(group: Option<String>, steps: Vec<Step>) -> Value {
    let steps: Vec<Value> = steps.into_iter().map(Step::into_value).collect();
    match group {
        Some(group) => json!([{ "group": group, "steps": steps }]),
        None => Value::Array(steps),
    }
}
