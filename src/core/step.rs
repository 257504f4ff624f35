//! Step domain model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel condition tag carried by steps that declare no conditions
pub const ALWAYS_CONDITION: &str = "ALWAYS";

/// A single step in a pipeline
///
/// Steps are open mappings: besides the handful of fields this tool
/// interprets (`conditions`, `commands`, `agents.queue`, `env`, `plugins`,
/// `instance_size`), a step carries arbitrary Buildkite fields that must
/// round-trip to the emitted output untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(Map<String, Value>);

impl Step {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The human-readable step label, if declared
    pub fn label(&self) -> Option<&str> {
        self.0.get("label").and_then(Value::as_str)
    }

    /// Condition tags gating this step
    ///
    /// A step without a `conditions` field is universally eligible and
    /// reports the `ALWAYS` sentinel.
    pub fn conditions(&self) -> Vec<String> {
        match self.0.get("conditions") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(_) => Vec::new(),
            None => vec![ALWAYS_CONDITION.to_string()],
        }
    }

    /// Whether this step declares a command list
    pub fn has_commands(&self) -> bool {
        matches!(self.0.get("commands"), Some(Value::Array(_)))
    }

    /// The step's command list, empty if none is declared
    pub fn commands(&self) -> Vec<String> {
        match self.0.get("commands") {
            Some(Value::Array(commands)) => commands
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_commands(&mut self, commands: Vec<String>) {
        self.0.insert(
            "commands".to_string(),
            Value::Array(commands.into_iter().map(Value::String).collect()),
        );
    }

    /// The declared instance-size label, if any
    pub fn instance_size(&self) -> Option<&str> {
        self.0.get("instance_size").and_then(Value::as_str)
    }

    /// Set `agents.queue`, creating the `agents` mapping if needed
    pub fn set_queue(&mut self, queue: &str) {
        let agents = self
            .0
            .entry("agents")
            .or_insert_with(|| Value::Object(Map::new()));
        if !agents.is_object() {
            *agents = Value::Object(Map::new());
        }
        if let Some(agents) = agents.as_object_mut() {
            agents.insert("queue".to_string(), Value::String(queue.to_string()));
        }
    }

    /// Set an entry in the step's `env` mapping, creating it if needed
    pub fn set_env(&mut self, key: &str, value: &str) {
        let env = self
            .0
            .entry("env")
            .or_insert_with(|| Value::Object(Map::new()));
        if !env.is_object() {
            *env = Value::Object(Map::new());
        }
        if let Some(env) = env.as_object_mut() {
            env.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    /// Write a docker image into the plugin list
    ///
    /// The slot is defined by the base template: the plugin entry whose
    /// name starts with `docker` (e.g. `docker#v5.3.0`). Returns whether
    /// a slot was found.
    pub fn set_docker_image(&mut self, image: &str) -> bool {
        let Some(Value::Array(plugins)) = self.0.get_mut("plugins") else {
            return false;
        };
        for plugin in plugins {
            let Some(plugin) = plugin.as_object_mut() else {
                continue;
            };
            let Some(name) = plugin.keys().find(|k| k.starts_with("docker")).cloned() else {
                continue;
            };
            if let Some(Value::Object(settings)) = plugin.get_mut(&name) {
                settings.insert("image".to_string(), Value::String(image.to_string()));
                return true;
            }
        }
        false
    }

    /// Remove a field, e.g. an internal-only key before emission
    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Step {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
