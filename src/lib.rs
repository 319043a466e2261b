//! batchimg - batch image processing library
//!
//! Applies a fixed-order pipeline of image operations to every file in a
//! source directory and writes the results, plus optional statistics
//! sidecars, to a destination directory.
//!
//! ## Features
//!
//! - **Geometry**: resize with Contain/Cover/Fit/Pad strategies, transpose,
//!   crop, scale, expand
//! - **Point operations**: flip, mirror, equalize, grayscale, invert,
//!   posterize, solarize
//! - **Filters**: ten named convolution kernels
//! - **Enhancements**: color, contrast, brightness, sharpness
//! - **Advanced**: filetype and mode conversion, per-band statistics
//!
//! Every operation is configured from text, validated when it runs, and
//! isolated: a bad parameter skips one operation, a failing file skips one
//! file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use batchimg::{process_directory, LogSink, PipelineConfig};
//! use std::path::Path;
//!
//! let mut config = PipelineConfig::default();
//! config.resize.enabled = true;
//! config.resize.size = "50%>1024x1024".to_string();
//!
//! let log = LogSink::new();
//! let summary = process_directory(Path::new("in"), Path::new("out"), &config, &log);
//! println!("{} processed, {} error(s)", summary.processed, summary.errors);
//! ```

pub mod batch;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod image_processor;
pub mod log;
pub mod pipeline;
pub mod save;
pub mod stats;
pub mod transform;
pub mod validate;

pub use batch::{BatchRunner, BatchStatus, Confirm, RunSummary};
pub use config::{FillColor, PipelineConfig, SaveOptions};
pub use dispatch::JobDispatcher;
pub use image_processor::ImageHandle;
pub use log::{LogEntry, LogSink, Severity};
pub use pipeline::{JobResult, execute};
pub use anyhow::Result;

/// Process one directory on the calling thread.
///
/// There is nobody to ask, so name collisions with existing outputs abort
/// the batch unless `config.overwrite` is set.
///
/// # Example
///
/// ```rust,no_run
/// use batchimg::{process_directory, LogSink, PipelineConfig};
/// use std::path::Path;
///
/// let config = PipelineConfig::load(Path::new("options.json"))?;
/// let log = LogSink::new();
/// process_directory(Path::new("in"), Path::new("out"), &config, &log);
/// log.save(Path::new("logs.txt"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn process_directory(
    input: &std::path::Path,
    output: &std::path::Path,
    config: &PipelineConfig,
    log: &LogSink,
) -> RunSummary {
    let decline = |_: &str, _: &str| false;
    BatchRunner::new(config, log, &decline).run(input, output)
}
