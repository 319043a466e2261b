mod cli;

use anyhow::{Context, Result};
use batchimg::{BatchStatus, Confirm, JobDispatcher, LogSink, PipelineConfig};
use clap::Parser;
use cli::Cli;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Confirmation on the terminal: `y` or `yes` accepts.
fn ask(title: &str, message: &str) -> bool {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{title}\n{message} [y/N] ");
    let _ = stdout.flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.overwrite |= cli.overwrite;

    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(|_: &str, _: &str| true)
    } else {
        Arc::new(ask)
    };

    println!(
        "Processing {} into {}...",
        cli.input.display(),
        cli.output.display()
    );

    let dispatcher = JobDispatcher::new(LogSink::new());
    let done = dispatcher
        .submit(cli.input.clone(), cli.output.clone(), config, Arc::clone(&confirm))
        .context("Failed to start batch worker")?;
    let summary = done.recv().context("Batch worker stopped unexpectedly")?;

    if !dispatcher.confirm_exit(confirm.as_ref()) {
        dispatcher.wait_idle();
    }

    if let Some(path) = &cli.log_file {
        dispatcher
            .log()
            .save(path)
            .with_context(|| format!("Failed to write log to {}", path.display()))?;
    }

    match summary.status {
        BatchStatus::Finished => println!(
            "Processed {} image(s) with {} error(s).",
            summary.processed, summary.errors
        ),
        BatchStatus::Declined => println!("Aborted, nothing was written."),
        BatchStatus::Failed => anyhow::bail!("Batch failed, see log for details"),
    }
    Ok(())
}
