//! Step finalization: queue, image, artifact destination

use crate::core::error::ConfigError;
use crate::core::queue::QueueMap;
use crate::core::step::Step;

/// Environment key the CI orchestrator reads the upload destination from
pub const ARTIFACT_DESTINATION_ENV: &str = "BUILDKITE_ARTIFACT_UPLOAD_DESTINATION";

/// Internal-only step fields stripped before emission; the downstream
/// orchestrator does not understand them
pub const INTERNAL_KEYS: [&str; 2] = ["conditions", "instance_size"];

/// Applies the run-wide execution parameters to each step and strips the
/// internal-only fields.
#[derive(Debug)]
pub struct Finalizer<'a> {
    queue: &'a str,
    image: Option<&'a str>,
    artifact_destination: &'a str,
    queues: &'a QueueMap,
}

impl<'a> Finalizer<'a> {
    pub fn new(
        queue: &'a str,
        image: Option<&'a str>,
        artifact_destination: &'a str,
        queues: &'a QueueMap,
    ) -> Self {
        Self {
            queue,
            image,
            artifact_destination,
            queues,
        }
    }

    /// Finalize one step in place.
    ///
    /// A declared `instance_size` takes precedence over the run-wide
    /// queue; an invalid label fails the whole run, as does an image
    /// override with no docker plugin slot to land in.
    pub fn finalize(&self, step: &mut Step) -> Result<(), ConfigError> {
        if let Some(image) = self.image {
            if !step.set_docker_image(image) {
                return Err(ConfigError::MissingDockerPlugin(image.to_string()));
            }
        }

        let queue = match step.instance_size().map(str::to_string) {
            Some(size) => self.queues.resolve(&size)?.to_string(),
            None => self.queue.to_string(),
        };
        step.set_queue(&queue);
        step.set_env(ARTIFACT_DESTINATION_ENV, self.artifact_destination);

        for key in INTERNAL_KEYS {
            step.remove(key);
        }
        Ok(())
    }
}
