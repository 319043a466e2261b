//! Error types for batchimg.
//!
//! None of these escape a batch run: the pipeline and the batch runner turn
//! them into log lines. They exist so that each layer can use `?` and the
//! layer above decides the severity.

use std::path::PathBuf;
use thiserror::Error;

/// A user-supplied parameter failed to parse or was out of range.
///
/// Surfaces as a `WARN` line; the operation is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Incorrect {0} syntax")]
    Syntax(&'static str),
    #[error("Invalid {0}")]
    Range(&'static str),
}

/// An operation failed unexpectedly while being applied to an image.
///
/// Surfaces as an `ERROR` line and increments the batch error counter.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{operation} is not supported for mode {mode}")]
    UnsupportedMode {
        operation: &'static str,
        mode: &'static str,
    },
    #[error("image has no pixels")]
    EmptyImage,
    #[error("resulting size {0}x{1} is empty")]
    ZeroSize(u32, u32),
    #[error("resulting size {width}x{height} exceeds {limit} pixels")]
    TooLarge { width: u64, height: u64, limit: u64 },
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("{0} panicked")]
    Panicked(&'static str),
}

/// Persisting a processed image failed.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("unknown file extension: {0}")]
    UnknownExtension(String),
    #[error("{0} encoding is not available")]
    UnsupportedFormat(&'static str),
    #[error("{format} encoder does not support option '{option}'")]
    UnsupportedOption {
        format: &'static str,
        option: &'static str,
    },
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failures scoped to one source file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("{path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{path}: {source}")]
    Save { path: PathBuf, source: SaveError },
    #[error("{path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failures that abort a whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Loading the option store from disk failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid fill color '{0}', expected #rrggbb or #rrggbbaa")]
    FillColor(String),
}
