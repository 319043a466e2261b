//! Batch runner: one source directory through the pipeline into one
//! destination directory.
//!
//! Images are handled strictly one after another. Only directory problems
//! end a batch early; anything that goes wrong with a single file is logged,
//! counted, and the runner moves on to the next entry.

use crate::config::PipelineConfig;
use crate::error::{BatchError, FileError};
use crate::image_processor::ImageHandle;
use crate::log::LogSink;
use crate::pipeline;
use crate::save::save_image;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Asks the operator a yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn confirm(&self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchStatus {
    #[default]
    Finished,
    /// The operator declined to overwrite existing outputs.
    Declined,
    /// A directory could not be created or listed.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub errors: usize,
    pub status: BatchStatus,
}

pub struct BatchRunner<'a> {
    config: &'a PipelineConfig,
    log: &'a LogSink,
    confirm: &'a dyn Confirm,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a PipelineConfig, log: &'a LogSink, confirm: &'a dyn Confirm) -> Self {
        Self {
            config,
            log,
            confirm,
        }
    }

    pub fn run(&self, input: &Path, output: &Path) -> RunSummary {
        self.log.info("Started processing job.");

        let entries = match prepare(input, output) {
            Ok(entries) => entries,
            Err(e) => {
                self.log.error(e.to_string());
                return RunSummary {
                    status: BatchStatus::Failed,
                    ..Default::default()
                };
            }
        };

        if entries.collides && !self.config.overwrite && !self.confirm_overwrite() {
            self.log.info("Aborted processing job.");
            return RunSummary {
                status: BatchStatus::Declined,
                ..Default::default()
            };
        }

        let mut summary = RunSummary::default();
        for path in &entries.sources {
            match self.process_file(path, output) {
                Ok(errors) => {
                    summary.processed += 1;
                    summary.errors += errors;
                }
                Err((e, errors)) => {
                    self.log.error(e.to_string());
                    summary.errors += errors + 1;
                }
            }
        }

        self.log.info(format!(
            "Finished processing {} images with {} error(s).",
            summary.processed, summary.errors
        ));
        summary
    }

    fn confirm_overwrite(&self) -> bool {
        self.confirm.confirm(
            "Overwrite Images?",
            "At least one image has the same name in the output directory.\n\
             Are you sure you want to overwrite these files?",
        )
    }

    /// Decode, transform and persist one file. Returns the number of
    /// operation errors logged along the way, also on failure.
    fn process_file(&self, path: &Path, output: &Path) -> Result<usize, (FileError, usize)> {
        let handle = ImageHandle::open(path).map_err(|source| {
            let e = FileError::Decode {
                path: path.to_path_buf(),
                source,
            };
            (e, 0)
        })?;

        let job = pipeline::execute(handle, self.config, self.log);
        let errors = job.errors;

        let image_path = output.join(format!("{}{}", job.name, job.extension));
        save_image(&job.image, &image_path, &job.extension, &self.config.save, self.log).map_err(
            |source| {
                let e = FileError::Save {
                    path: image_path.clone(),
                    source,
                };
                (e, errors)
            },
        )?;
        self.log.file("Applied extension-specific options.");
        self.log.file(format!("Saved image: {}", image_path.display()));

        if let Some(text) = &job.statistics {
            let stats_path = output.join(format!("{}.txt", job.name));
            fs::write(&stats_path, text).map_err(|source| {
                let e = FileError::Sidecar {
                    path: stats_path.clone(),
                    source,
                };
                (e, errors)
            })?;
            self.log
                .file(format!("Saved statistics: {}.", stats_path.display()));
        }

        Ok(errors)
    }
}

struct Entries {
    /// Source entries in name order.
    sources: Vec<PathBuf>,
    /// Some source base name already exists in the destination.
    collides: bool,
}

fn prepare(input: &Path, output: &Path) -> Result<Entries, BatchError> {
    for dir in [input, output] {
        fs::create_dir_all(dir).map_err(|source| BatchError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut sources = list(input)?;
    sources.sort();

    let existing: HashSet<String> = list(output)?.iter().map(|p| base_name(p)).collect();
    let collides = sources.iter().any(|p| existing.contains(&base_name(p)));

    Ok(Entries { sources, collides })
}

fn list(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let read_error = |source| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()).map_err(read_error))
        .collect()
}

/// Name without extension, lower-cased and trimmed, for collision checks.
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().trim().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Severity;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_png(dir: &Path, name: &str) {
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
            .save(dir.join(name))
            .unwrap();
    }

    fn never(_: &str, _: &str) -> bool {
        panic!("confirmation should not be requested")
    }

    #[test]
    fn test_base_name_normalization() {
        assert_eq!(base_name(Path::new("/x/ Photo .JPG")), "photo");
        assert_eq!(base_name(Path::new("/x/archive.tar.gz")), "archive.tar");
    }

    #[test]
    fn test_creates_missing_directories() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("nested/out");
        let log = LogSink::new();
        let config = PipelineConfig::default();
        let summary = BatchRunner::new(&config, &log, &never).run(&input, &output);
        assert!(input.is_dir() && output.is_dir());
        assert_eq!(summary, RunSummary::default());
        assert_eq!(
            log.snapshot().last().unwrap().to_string(),
            "[INFO] Finished processing 0 images with 0 error(s)."
        );
    }

    #[test]
    fn test_uncreatable_directory_fails_batch() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let log = LogSink::new();
        let config = PipelineConfig::default();
        let summary =
            BatchRunner::new(&config, &log, &never).run(&blocker.join("in"), root.path());
        assert_eq!(summary.status, BatchStatus::Failed);
        assert_eq!(summary.processed, 0);
        assert_eq!(log.count(Severity::Error), 1);
    }

    #[test]
    fn test_decline_aborts_without_processing() {
        let root = tempfile::tempdir().unwrap();
        let (input, output) = (root.path().join("in"), root.path().join("out"));
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        write_png(&input, "a.png");
        write_png(&output, "A.jpg");

        let asked = AtomicUsize::new(0);
        let decline = |_: &str, _: &str| {
            asked.fetch_add(1, Ordering::SeqCst);
            false
        };
        let log = LogSink::new();
        let config = PipelineConfig::default();
        let summary = BatchRunner::new(&config, &log, &decline).run(&input, &output);
        assert_eq!(summary.status, BatchStatus::Declined);
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert_eq!(
            log.snapshot().last().unwrap().to_string(),
            "[INFO] Aborted processing job."
        );
    }

    #[test]
    fn test_overwrite_flag_skips_confirmation() {
        let root = tempfile::tempdir().unwrap();
        let (input, output) = (root.path().join("in"), root.path().join("out"));
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        write_png(&input, "a.png");
        write_png(&output, "a.png");

        let config = PipelineConfig {
            overwrite: true,
            ..Default::default()
        };
        let summary = BatchRunner::new(&config, &LogSink::new(), &never).run(&input, &output);
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn test_save_failure_is_counted_per_file() {
        let root = tempfile::tempdir().unwrap();
        let (input, output) = (root.path().join("in"), root.path().join("out"));
        fs::create_dir_all(&input).unwrap();
        write_png(&input, "a.png");
        write_png(&input, "b.png");

        let mut config = PipelineConfig::default();
        config.filetype.enabled = true;
        config.filetype.format = "spi".to_string();
        let log = LogSink::new();
        let summary = BatchRunner::new(&config, &log, &never).run(&input, &output);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.errors, 2);
        assert_eq!(log.count(Severity::Error), 2);
    }
}
