//! Periodic refresh loop.
//!
//! Passes never overlap: the next pass starts one interval after the
//! previous one started, or right away if that pass overran.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::aggregate::Dashboard;

/// Receives every finished pass.
pub trait DashboardSink {
    fn publish(&mut self, dashboard: &Dashboard, last_updated: &str) -> anyhow::Result<()>;
}

const STOP_POLL: Duration = Duration::from_millis(200);

pub struct RefreshScheduler {
    interval: Duration,
    max_passes: Option<u64>,
    last_updated: Option<String>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_passes: None,
            last_updated: None,
        }
    }

    /// Stop after `passes` passes instead of running until stopped.
    pub fn with_max_passes(mut self, passes: u64) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Local wall-clock time the most recent pass finished.
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Run `pass` now and then every interval until `stop` is set or the
    /// pass limit is reached. Returns the number of passes run.
    ///
    /// A pass always runs to completion; `stop` is only checked between
    /// passes. Sink failures are logged and the loop keeps going.
    pub fn run(
        &mut self,
        mut pass: impl FnMut() -> Dashboard,
        sink: &mut dyn DashboardSink,
        stop: &AtomicBool,
    ) -> u64 {
        let mut passes = 0;
        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }

            let started = Instant::now();
            let dashboard = pass();
            let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
            if let Err(e) = sink.publish(&dashboard, &stamp) {
                tracing::warn!(error = %format!("{e:#}"), "publishing dashboard failed");
            }
            self.last_updated = Some(stamp);
            passes += 1;

            if self.max_passes.is_some_and(|max| passes >= max) {
                break;
            }
            // An interval too large to represent waits until stopped.
            wait_until(started.checked_add(self.interval), stop);
        }
        tracing::info!(passes, "refresh loop stopped");
        passes
    }
}

fn wait_until(deadline: Option<Instant>, stop: &AtomicBool) {
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let nap = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return;
                }
                (deadline - now).min(STOP_POLL)
            }
            None => STOP_POLL,
        };
        std::thread::sleep(nap);
    }
}
