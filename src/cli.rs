use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "batchimg")]
#[command(about = "Apply a fixed pipeline of image operations to every file in a directory")]
#[command(version)]
pub struct Cli {
    /// Source directory (created if missing)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Destination directory (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON file with operation options; everything is disabled without it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overwrite existing outputs without asking
    #[arg(long)]
    pub overwrite: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Write the processing log to this file when done
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
}
