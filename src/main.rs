use anyhow::{Context, Result};
use pipeline_gen::cli::Cli;
use pipeline_gen::{Assembler, EnvConfig};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Logging goes to stderr; stdout carries the emitted step list
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let queue = cli.queue.clone().context("Please specify a runner queue using --queue")?;

    let config = EnvConfig::from_env();
    let assembler = Assembler::new(config, queue, cli.image.clone(), cli.early_filter());

    let payload = assembler.assemble(&cli.pipeline, &cli.base_step_file)?;
    println!("{payload}");

    Ok(())
}
