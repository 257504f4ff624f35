//! Pipeline file reading

use crate::core::error::ConfigError;
use crate::core::step::Step;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Leading comment directive assigning a group name to the whole pipeline,
/// e.g. `#ci:group=build`
pub const GROUP_DIRECTIVE: &str = "#ci:group=";

/// A parsed pipeline declaration: an ordered step list plus an optional
/// group label
#[derive(Debug, Clone, Default)]
pub struct PipelineFile {
    pub group: Option<String>,
    pub steps: Vec<Step>,
}

impl PipelineFile {
    /// Read a pipeline declaration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingPipelineFile(path.to_path_buf()).into());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse pipeline file: {}", path.display()))
    }

    /// Parse a pipeline declaration from a YAML string
    ///
    /// The document is either a flat step sequence or a `{steps: [...]}`
    /// wrapper (e.g. the MacOS pipeline is a full Buildkite yaml). An
    /// empty document yields no steps.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let group = yaml
            .lines()
            .next()
            .and_then(|line| line.trim().strip_prefix(GROUP_DIRECTIVE))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let doc: serde_yaml::Value =
            serde_yaml::from_str(yaml).context("Pipeline file is not valid YAML")?;

        let raw_steps = match doc {
            serde_yaml::Value::Null => Vec::new(),
            serde_yaml::Value::Sequence(steps) => steps,
            serde_yaml::Value::Mapping(mut doc) => match doc.remove("steps") {
                Some(serde_yaml::Value::Sequence(steps)) => steps,
                Some(serde_yaml::Value::Null) | None => {
                    bail!("Pipeline mapping has no 'steps' list")
                }
                Some(_) => bail!("Pipeline 'steps' must be a list"),
            },
            _ => bail!("Pipeline file must be a step list or a mapping with 'steps'"),
        };

        let mut steps = Vec::with_capacity(raw_steps.len());
        for (index, raw) in raw_steps.into_iter().enumerate() {
            let value = serde_json::to_value(&raw)
                .with_context(|| format!("Step {index} is not representable as JSON"))?;
            match value {
                Value::Object(map) => steps.push(Step::from(map)),
                other => bail!("Step {index} must be a mapping, got: {other}"),
            }
        }

        Ok(Self { group, steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_directive_only() {
        let pipeline = PipelineFile::from_yaml("#ci:group=foo").unwrap();
        assert_eq!(pipeline.group.as_deref(), Some("foo"));
        assert!(pipeline.steps.is_empty());
    }

    #[test]
    fn test_flat_step_list() {
        let pipeline = PipelineFile::from_yaml("- name: foo").unwrap();
        assert_eq!(pipeline.group, None);
        assert_eq!(pipeline.steps.len(), 1);
        assert_eq!(
            pipeline.steps[0].get("name").unwrap().as_str(),
            Some("foo")
        );
    }

    #[test]
    fn test_steps_wrapper() {
        let pipeline = PipelineFile::from_yaml("steps:\n  - name: foo\n").unwrap();
        assert_eq!(pipeline.group, None);
        assert_eq!(pipeline.steps.len(), 1);
    }

    #[test]
    fn test_group_directive_with_steps() {
        let pipeline = PipelineFile::from_yaml("#ci:group=foo\nsteps:\n  - name: foo\n").unwrap();
        assert_eq!(pipeline.group.as_deref(), Some("foo"));
        assert_eq!(pipeline.steps.len(), 1);
    }

    #[test]
    fn test_directive_must_be_first_line() {
        let pipeline = PipelineFile::from_yaml("- name: foo\n#ci:group=bar\n").unwrap();
        assert_eq!(pipeline.group, None);
    }

    #[test]
    fn test_scalar_step_rejected() {
        assert!(PipelineFile::from_yaml("- just a string").is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PipelineFile::from_file("/nonexistent/pipeline.yml").unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
