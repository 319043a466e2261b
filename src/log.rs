//! Append-only, shared processing log.
//!
//! Every batch writes human-readable lines here. The sink is shared by all
//! running batches, so lines from concurrent jobs interleave. Each append is
//! also forwarded to `tracing` so the same events show up in the console.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tag carried by every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warn,
    Error,
    File,
    Transform,
    Advanced,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::File => "FILE",
            Severity::Transform => "TRANSFORM",
            Severity::Advanced => "ADVANCED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str(), self.message)
    }
}

/// Cloneable handle to the shared log.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // A panic while holding the lock cannot leave a half-pushed entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, severity: Severity, message: impl Into<String>) {
        let entry = LogEntry::new(severity, message);
        match severity {
            Severity::Warn => tracing::warn!("{}", entry.message),
            Severity::Error => tracing::error!("{}", entry.message),
            Severity::Info | Severity::File => tracing::info!("{}", entry.message),
            Severity::Transform | Severity::Advanced => tracing::debug!("{}", entry.message),
        }
        self.lock().push(entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(Severity::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn file(&self, message: impl Into<String>) {
        self.push(Severity::File, message);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current entries, in append order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Number of entries with the given tag.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|e| e.severity == severity).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Write every entry, one per line. An empty log writes nothing.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let entries = self.snapshot();
        if entries.is_empty() {
            return Ok(());
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for entry in &entries {
            writeln!(file, "{entry}")?;
        }
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_display_has_tag_prefix() {
        let entry = LogEntry::new(Severity::Transform, "Flipped image.");
        assert_eq!(entry.to_string(), "[TRANSFORM] Flipped image.");
    }

    #[test]
    fn test_clones_share_entries() {
        let log = LogSink::new();
        let other = log.clone();
        log.info("one");
        other.warn("two");
        assert_eq!(log.len(), 2);
        assert_eq!(log.count(Severity::Warn), 1);
        assert_eq!(other.snapshot()[0].message, "one");
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let log = LogSink::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        log.info(format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 800);
    }

    #[test]
    fn test_save_writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        let log = LogSink::new();
        log.info("Started processing job.");
        log.error("boom");
        log.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[INFO] Started processing job.\n[ERROR] boom\n");
    }

    #[test]
    fn test_save_skips_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        LogSink::new().save(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_clear() {
        let log = LogSink::new();
        log.file("x");
        log.clear();
        assert!(log.is_empty());
    }
}
