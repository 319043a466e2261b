//! Job dispatcher.
//!
//! Each submitted batch runs on its own named thread with its own config
//! snapshot and counters, so one waiting on an overwrite confirmation never
//! holds up another. All jobs share the log and the active-job counter.

use crate::batch::{BatchRunner, Confirm, RunSummary};
use crate::config::PipelineConfig;
use crate::log::LogSink;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, mpsc};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct JobDispatcher {
    active: Arc<ActiveJobs>,
    log: LogSink,
}

/// Number of running jobs, with a condition signalled when it reaches zero.
#[derive(Debug, Default)]
struct ActiveJobs {
    count: Mutex<usize>,
    idle: Condvar,
}

impl ActiveJobs {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(self: &Arc<Self>) -> ActiveGuard {
        *self.lock() += 1;
        ActiveGuard(Arc::clone(self))
    }

    fn finish(&self) {
        let mut count = self.lock();
        // never below zero
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let count = self.lock();
        let _idle = self
            .idle
            .wait_while(count, |n| *n > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }
}

/// Decrements the active-job counter when a job ends, however it ends.
struct ActiveGuard(Arc<ActiveJobs>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

impl JobDispatcher {
    pub fn new(log: LogSink) -> Self {
        Self {
            active: Arc::default(),
            log,
        }
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    /// Start a batch in the background. The receiver yields its summary once
    /// it has finished.
    ///
    /// Fails only if the operating system refuses to start a thread; the
    /// job is then not counted.
    pub fn submit(
        &self,
        input: PathBuf,
        output: PathBuf,
        config: PipelineConfig,
        confirm: Arc<dyn Confirm>,
    ) -> io::Result<mpsc::Receiver<RunSummary>> {
        let (tx, rx) = mpsc::channel();
        let guard = self.active.start();
        let log = self.log.clone();

        // dropping the closure on failure drops the guard too
        thread::Builder::new()
            .name(format!("batch {}", input.display()))
            .spawn(move || {
                let summary = {
                    let _guard = guard;
                    BatchRunner::new(&config, &log, confirm.as_ref()).run(&input, &output)
                };
                // the caller may have stopped listening
                let _ = tx.send(summary);
            })?;
        Ok(rx)
    }

    pub fn active_jobs(&self) -> usize {
        *self.active.lock()
    }

    /// Block until no job is running.
    pub fn wait_idle(&self) {
        self.active.wait_idle();
    }

    /// Whether the process may exit now. Asks only while jobs are running.
    pub fn confirm_exit(&self, confirm: &dyn Confirm) -> bool {
        match self.active_jobs() {
            0 => true,
            n => confirm.confirm(
                "Quit?",
                &format!("{n} job(s) still running. Do you want to quit anyway?"),
            ),
        }
    }
}
