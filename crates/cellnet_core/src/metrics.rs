//! Performance metrics collection for the engine.
//!
//! Counters are plain atomics so any thread can read them while the
//! worker keeps writing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Engine statistics shared between the worker and observers.
pub struct Metrics {
    step_count: AtomicU64,
    active_cells: AtomicU64,
    last_step_micros: AtomicU64,
    compactions: AtomicU64,
    dropped_commands: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step_count: AtomicU64::new(0),
            active_cells: AtomicU64::new(0),
            last_step_micros: AtomicU64::new(0),
            compactions: AtomicU64::new(0),
            dropped_commands: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed time step with its duration.
    pub fn record_step(&self, duration: Duration, active: usize) {
        let steps = self.step_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.active_cells.store(active as u64, Ordering::Relaxed);
        self.last_step_micros
            .store(duration.as_micros() as u64, Ordering::Relaxed);

        // Log at info level every 1000 steps
        if steps % 1000 == 0 {
            tracing::info!(
                steps = steps,
                active = active,
                duration_us = duration.as_micros() as u64,
                "Time step"
            );
        }
    }

    pub fn record_compaction(&self) {
        self.compactions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_command(&self) {
        self.dropped_commands.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn active_cells(&self) -> u64 {
        self.active_cells.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_step_duration(&self) -> Duration {
        Duration::from_micros(self.last_step_micros.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn compactions(&self) -> u64 {
        self.compactions.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn dropped_commands(&self) -> u64 {
        self.dropped_commands.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG`; falls back to `info`. Safe to call more than once.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.step_count(), 0);
        assert_eq!(metrics.compactions(), 0);
    }

    #[test]
    fn test_record_step() {
        let metrics = Metrics::new();
        metrics.record_step(Duration::from_micros(250), 17);
        assert_eq!(metrics.step_count(), 1);
        assert_eq!(metrics.active_cells(), 17);
        assert_eq!(metrics.last_step_duration(), Duration::from_micros(250));
    }

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.record_compaction();
        metrics.record_dropped_command();
        metrics.record_dropped_command();
        assert_eq!(metrics.compactions(), 1);
        assert_eq!(metrics.dropped_commands(), 2);
    }
}
