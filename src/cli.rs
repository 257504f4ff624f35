//! Command-line interface

use crate::assemble::EarlyFilter;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Generate a Buildkite step list from a declarative YAML pipeline
#[derive(Debug, Parser, Clone)]
#[command(name = "pipeline-gen")]
#[command(version = "0.1.0")]
#[command(about = "Generates Buildkite step lists from declarative YAML pipelines", long_about = None)]
pub struct Cli {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,

    /// Docker image written into the base template's docker plugin
    #[arg(long, required = true)]
    pub image: Option<String>,

    /// Runner queue for steps without an instance size
    #[arg(long, required = true)]
    pub queue: Option<String>,

    /// Path to the base step template (JSON). The default is resolved
    /// against the current working directory
    #[arg(long, default_value = "step_linux.json")]
    pub base_step_file: PathBuf,

    /// Only emit early kick-off steps, with checkout setup commands prepended
    #[arg(long, conflicts_with = "not_early_only")]
    pub early_only: bool,

    /// Skip early kick-off steps
    #[arg(long)]
    pub not_early_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Which pipeline phase this invocation emits
    pub fn early_filter(&self) -> EarlyFilter {
        if self.early_only {
            EarlyFilter::EarlyOnly
        } else if self.not_early_only {
            EarlyFilter::NotEarlyOnly
        } else {
            EarlyFilter::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from([
            "pipeline-gen",
            "--image",
            "base_img",
            "--queue",
            "q",
            "pipeline.yml",
        ])
        .unwrap();
        assert_eq!(cli.pipeline, PathBuf::from("pipeline.yml"));
        assert_eq!(cli.image.as_deref(), Some("base_img"));
        assert_eq!(cli.queue.as_deref(), Some("q"));
        assert_eq!(cli.early_filter(), EarlyFilter::All);
    }

    #[test]
    fn test_queue_is_required() {
        let result = Cli::try_parse_from(["pipeline-gen", "--image", "img", "pipeline.yml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_is_required() {
        let result = Cli::try_parse_from(["pipeline-gen", "--queue", "q", "pipeline.yml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_early_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "pipeline-gen",
            "--image",
            "img",
            "--queue",
            "q",
            "--early-only",
            "--not-early-only",
            "pipeline.yml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_early_filter_selection() {
        let cli = Cli::try_parse_from([
            "pipeline-gen",
            "--image",
            "img",
            "--queue",
            "q",
            "--early-only",
            "pipeline.yml",
        ])
        .unwrap();
        assert_eq!(cli.early_filter(), EarlyFilter::EarlyOnly);

        let cli = Cli::try_parse_from([
            "pipeline-gen",
            "--image",
            "img",
            "--queue",
            "q",
            "--not-early-only",
            "pipeline.yml",
        ])
        .unwrap();
        assert_eq!(cli.early_filter(), EarlyFilter::NotEarlyOnly);
    }
}
