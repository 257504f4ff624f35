//! Environment configuration captured once at startup

use crate::core::error::ConfigError;
use crate::core::step::ALWAYS_CONDITION;
use std::collections::HashMap;

/// Prefix of environment variables contributing affected-set condition tags
pub const AFFECTED_PREFIX: &str = "RAY_CI_";

/// Prefix of environment variables mapping instance sizes to runner queues
pub const QUEUE_ENV_PREFIX: &str = "RUNNER_QUEUE_";

/// The process environment captured into an immutable configuration value.
///
/// Built once at startup and injected into the assembler; components never
/// read the process environment ad hoc, so tests construct this directly
/// from an iterator instead of mutating global state.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `BUCKET_PATH` - artifact bucket root
    pub bucket_path: Option<String>,
    /// `BUILDKITE_COMMIT` - commit hash of the triggering revision
    pub commit: Option<String>,
    /// `BUILDKITE_BRANCH` - branch, possibly `user:branch` for fork PRs
    pub branch: Option<String>,
    /// `BUILDKITE_PULL_REQUEST_REPO` - clone URL of the PR repository
    pub pull_request_repo: Option<String>,
    /// `ALL_TESTS=1` skips affected-set filtering entirely
    pub all_tests: bool,
    /// Truthy `RAY_CI_*` variable names, sorted for determinism
    affected: Vec<String>,
    /// `RUNNER_QUEUE_*` entries, keyed by the upper-case variable suffix
    runner_queues: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        std::env::vars().collect()
    }

    /// The include set for affected-set filtering: `ALWAYS` plus every
    /// truthy `RAY_CI_*` variable name
    pub fn affected_set_conditions(&self) -> Vec<String> {
        let mut conditions = vec![ALWAYS_CONDITION.to_string()];
        conditions.extend(self.affected.iter().cloned());
        conditions
    }

    /// Look up the runner queue configured for an instance-size label
    pub fn runner_queue(&self, label: &str) -> Option<&str> {
        self.runner_queues
            .get(&queue_env_suffix(label))
            .map(String::as_str)
    }

    /// Artifact upload destination: `BUCKET_PATH/BUILDKITE_COMMIT`
    pub fn artifact_destination(&self) -> Result<String, ConfigError> {
        let bucket = self
            .bucket_path
            .as_deref()
            .ok_or(ConfigError::MissingEnv("BUCKET_PATH"))?;
        let commit = self
            .commit
            .as_deref()
            .ok_or(ConfigError::MissingEnv("BUILDKITE_COMMIT"))?;
        Ok(format!("{bucket}/{commit}"))
    }
}

impl FromIterator<(String, String)> for EnvConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(vars: I) -> Self {
        let mut config = EnvConfig::default();
        for (key, value) in vars {
            match key.as_str() {
                "BUCKET_PATH" => config.bucket_path = Some(value),
                "BUILDKITE_COMMIT" => config.commit = Some(value),
                "BUILDKITE_BRANCH" => config.branch = Some(value),
                "BUILDKITE_PULL_REQUEST_REPO" => config.pull_request_repo = Some(value),
                "ALL_TESTS" => config.all_tests = value == "1",
                _ if key.starts_with(AFFECTED_PREFIX) => {
                    if is_truthy(&value) {
                        config.affected.push(key);
                    }
                }
                _ if key.starts_with(QUEUE_ENV_PREFIX) => {
                    let suffix = key[QUEUE_ENV_PREFIX.len()..].to_string();
                    config.runner_queues.insert(suffix, value);
                }
                _ => {}
            }
        }
        config.affected.sort();
        config
    }
}

/// Environment variable name for an instance-size label, e.g.
/// `gpu-large` looks up `RUNNER_QUEUE_GPU_LARGE`
pub fn queue_env_var(label: &str) -> String {
    format!("{QUEUE_ENV_PREFIX}{}", queue_env_suffix(label))
}

fn queue_env_suffix(label: &str) -> String {
    label.to_uppercase().replace('-', "_")
}

fn is_truthy(value: &str) -> bool {
    value.trim().parse::<i64>().map(|v| v != 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> EnvConfig {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_capture_buildkite_vars() {
        let config = config(&[
            ("BUCKET_PATH", "s3://bucket"),
            ("BUILDKITE_COMMIT", "abcd1234"),
            ("BUILDKITE_BRANCH", "user:feature"),
            ("BUILDKITE_PULL_REQUEST_REPO", "https://example.com/repo"),
            ("UNRELATED", "ignored"),
        ]);
        assert_eq!(config.bucket_path.as_deref(), Some("s3://bucket"));
        assert_eq!(config.commit.as_deref(), Some("abcd1234"));
        assert_eq!(config.branch.as_deref(), Some("user:feature"));
        assert_eq!(
            config.pull_request_repo.as_deref(),
            Some("https://example.com/repo")
        );
        assert!(!config.all_tests);
    }

    #[test]
    fn test_affected_set_conditions() {
        let config = config(&[
            ("RAY_CI_JAVA_AFFECTED", "1"),
            ("RAY_CI_TRAIN_AFFECTED", "1"),
            ("RAY_CI_DOC_AFFECTED", "0"),
            ("RAY_CI_BOGUS", "not-a-number"),
        ]);
        assert_eq!(
            config.affected_set_conditions(),
            vec![
                "ALWAYS".to_string(),
                "RAY_CI_JAVA_AFFECTED".to_string(),
                "RAY_CI_TRAIN_AFFECTED".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_tests_flag() {
        assert!(config(&[("ALL_TESTS", "1")]).all_tests);
        assert!(!config(&[("ALL_TESTS", "0")]).all_tests);
        assert!(!config(&[]).all_tests);
    }

    #[test]
    fn test_runner_queue_lookup() {
        let config = config(&[
            ("RUNNER_QUEUE_SMALL", "small_q"),
            ("RUNNER_QUEUE_GPU_LARGE", "gpularge_q"),
        ]);
        assert_eq!(config.runner_queue("small"), Some("small_q"));
        assert_eq!(config.runner_queue("gpu-large"), Some("gpularge_q"));
        assert_eq!(config.runner_queue("medium"), None);
    }

    #[test]
    fn test_queue_env_var_name() {
        assert_eq!(queue_env_var("small"), "RUNNER_QUEUE_SMALL");
        assert_eq!(queue_env_var("gpu-large"), "RUNNER_QUEUE_GPU_LARGE");
    }

    #[test]
    fn test_artifact_destination() {
        let full = config(&[("BUCKET_PATH", "s3://bucket"), ("BUILDKITE_COMMIT", "abcd")]);
        assert_eq!(full.artifact_destination().unwrap(), "s3://bucket/abcd");

        let missing = config(&[("BUILDKITE_COMMIT", "abcd")]);
        let err = missing.artifact_destination().unwrap_err();
        assert!(err.to_string().contains("BUCKET_PATH"));
    }
}
