//! Work-unit scheduler using Rayon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{ProgressError, Result};
use crate::progress::ProgressTracker;

/// Spreads independent work units over a thread pool, reporting each
/// completed unit to a tracker.
pub struct WorkScheduler {
    /// Number of threads to use.
    num_threads: usize,

    /// Stop flag checked before each unit.
    stopped: Arc<AtomicBool>,
}

impl WorkScheduler {
    /// Create a new scheduler with the specified number of threads.
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the number of threads.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Skip all units not yet begun.
    ///
    /// This stops producing work; the tracker is still finished normally.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Check if stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Build the thread pool this scheduler runs on.
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| ProgressError::Internal(e.to_string()))
    }

    /// Run `work` for every unit in `0..units` in parallel, then finish the
    /// tracker.
    ///
    /// Returns the number of units that ran.
    pub fn run<T, F>(&self, units: u64, tracker: &T, work: F) -> Result<u64>
    where
        T: ProgressTracker + ?Sized,
        F: Fn(u64) + Send + Sync,
    {
        let stopped = self.stopped.clone();
        let pool = self.build_pool()?;

        log::debug!("Running {} units on {} threads", units, self.num_threads);

        let ran = pool.install(|| {
            (0..units)
                .into_par_iter()
                .map(|unit| {
                    if stopped.load(Ordering::SeqCst) {
                        return 0;
                    }
                    work(unit);
                    tracker.unit_done();
                    1
                })
                .sum::<u64>()
        });

        tracker.finished();
        Ok(ran)
    }
}

impl Default for WorkScheduler {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{tracker_with_sink, ChannelSink, LifecycleState, NullTracker};
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_scheduler_creation() {
        let scheduler = WorkScheduler::new(4);
        assert_eq!(scheduler.num_threads(), 4);
        assert!(!scheduler.is_stopped());

        assert_eq!(WorkScheduler::new(0).num_threads(), 1);
    }

    #[test]
    fn test_scheduler_default() {
        let scheduler = WorkScheduler::default();
        assert_eq!(scheduler.num_threads(), num_cpus::get());
    }

    #[test]
    fn test_run_reports_every_unit() {
        let scheduler = WorkScheduler::new(4);
        let (sink, receiver) = ChannelSink::new("simulate");
        let tracker = tracker_with_sink(1000, sink);
        let sum = AtomicU64::new(0);

        let ran = scheduler
            .run(1000, &tracker, |unit| {
                sum.fetch_add(unit, Ordering::Relaxed);
            })
            .unwrap();

        assert_eq!(ran, 1000);
        assert_eq!(sum.load(Ordering::Relaxed), 999 * 1000 / 2);
        assert_eq!(tracker.state(), LifecycleState::Finished);

        let percents: Vec<u8> = receiver
            .collect_until_complete()
            .iter()
            .filter_map(|e| e.percent())
            .collect();
        // Concurrent producers may skip a percent, never repeat or reverse one.
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(percents.last(), Some(&100));
    }

    #[test]
    fn test_run_with_null_tracker() {
        let scheduler = WorkScheduler::new(2);
        let ran = scheduler.run(10, &NullTracker, |_| {}).unwrap();
        assert_eq!(ran, 10);
    }

    #[test]
    fn test_stopped_scheduler_still_finishes_tracker() {
        let scheduler = WorkScheduler::new(2);
        let (sink, receiver) = ChannelSink::new("simulate");
        let tracker = tracker_with_sink(10, sink);

        scheduler.stop();
        let ran = scheduler.run(10, &tracker, |_| unreachable!()).unwrap();

        assert_eq!(ran, 0);
        let events = receiver.collect_until_complete();
        assert_eq!(events.iter().filter_map(|e| e.percent()).collect::<Vec<_>>(), vec![100]);
    }
}
