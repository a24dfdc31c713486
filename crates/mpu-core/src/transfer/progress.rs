//! Upload progress reporting.
//!
//! Request bodies report bytes as they are sent. Observers are shared across
//! part tasks, so implementations must tolerate concurrent calls.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Receives incremental byte counts from concurrent upload workers.
pub trait ProgressObserver: Send + Sync {
    fn on_bytes(&self, bytes: u64);
}

/// Observer that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_bytes(&self, _bytes: u64) {}
}

/// Snapshot of upload progress for one file.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub bytes_done: u64,
    pub total_bytes: u64,
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Upload rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if the rate is still 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Percentage complete in [0, 100]. An empty file counts as complete.
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64 * 100.0).min(100.0)
    }
}

struct PercentageState {
    seen: u64,
    out: Box<dyn Write + Send>,
}

/// Prints `label  seen / total  (pct%)` on one line, rewritten in place.
/// The running total is kept under a mutex so concurrent part tasks see a
/// consistent sum.
pub struct ProgressPercentage {
    label: String,
    total: u64,
    started: Instant,
    state: Mutex<PercentageState>,
}

impl ProgressPercentage {
    pub fn new(label: impl Into<String>, total: u64) -> Self {
        Self::with_writer(label, total, Box::new(io::stdout()))
    }

    pub fn with_writer(label: impl Into<String>, total: u64, out: Box<dyn Write + Send>) -> Self {
        Self {
            label: label.into(),
            total,
            started: Instant::now(),
            state: Mutex::new(PercentageState { seen: 0, out }),
        }
    }

    pub fn stats(&self) -> ProgressStats {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        ProgressStats {
            bytes_done: state.seen,
            total_bytes: self.total,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl ProgressObserver for ProgressPercentage {
    fn on_bytes(&self, bytes: u64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.seen += bytes;
        let stats = ProgressStats {
            bytes_done: state.seen,
            total_bytes: self.total,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        };
        let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
        let eta = stats
            .eta_secs()
            .map(|s| format!("{:.0}s", s))
            .unwrap_or_else(|| "?".to_string());
        // Write errors on the progress line are ignored.
        let _ = write!(
            state.out,
            "\r{}  {} / {}  ({:.2}%)  {:.2} MiB/s  ETA {}  ",
            self.label,
            stats.bytes_done,
            stats.total_bytes,
            stats.percentage(),
            rate_mib,
            eta
        );
        let _ = state.out.flush();
    }
}
