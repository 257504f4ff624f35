//! Instance-size to runner-queue resolution

use crate::core::config::{queue_env_var, EnvConfig};
use crate::core::error::ConfigError;
use std::collections::HashMap;

/// Recognized instance-size labels
pub const INSTANCE_SIZES: [&str; 4] = ["small", "medium", "large", "gpu"];

/// Values still carrying this prefix are unconfigured placeholders
const PLACEHOLDER_PREFIX: &str = "__";

/// Fixed mapping from instance-size label to a concrete runner queue.
///
/// Populated once from the captured environment; a label whose
/// `RUNNER_QUEUE_*` variable is unset keeps a `__`-prefixed placeholder
/// and fails resolution, so a job never silently lands on the wrong
/// hardware class.
#[derive(Debug, Clone)]
pub struct QueueMap {
    queues: HashMap<String, String>,
}

impl QueueMap {
    pub fn from_config(config: &EnvConfig) -> Self {
        let queues = INSTANCE_SIZES
            .iter()
            .map(|size| {
                let queue = config
                    .runner_queue(size)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("__runner_queue_{}", size.replace('-', "_")));
                (size.to_string(), queue)
            })
            .collect();
        Self { queues }
    }

    /// Resolve a label to its configured queue name
    pub fn resolve(&self, size: &str) -> Result<&str, ConfigError> {
        let queue = self
            .queues
            .get(size)
            .ok_or_else(|| ConfigError::UnknownInstanceSize {
                size: size.to_string(),
                valid: INSTANCE_SIZES.iter().map(|s| s.to_string()).collect(),
            })?;
        if queue.starts_with(PLACEHOLDER_PREFIX) {
            return Err(ConfigError::UnconfiguredQueue {
                size: size.to_string(),
                env_var: queue_env_var(size),
            });
        }
        Ok(queue)
    }
}
