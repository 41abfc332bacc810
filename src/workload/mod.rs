//! Demo producers that exercise trackers from many threads.
//!
//! These stand in for the image-processing code that normally owns the
//! trackers: a synthetic unit runner and a row-parallel image filter.

mod invert;
mod scheduler;

pub use invert::{invert_file, invert_rows, InvertSummary};
pub use scheduler::WorkScheduler;

use std::time::Duration;

use crate::error::Result;
use crate::progress::ProgressTracker;

/// Run `units` synthetic units that each busy-wait for `unit_cost`.
pub fn simulate<T>(scheduler: &WorkScheduler, units: u64, unit_cost: Duration, tracker: &T) -> Result<u64>
where
    T: ProgressTracker + ?Sized,
{
    scheduler.run(units, tracker, |_| spin_for(unit_cost))
}

fn spin_for(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    let start = std::time::Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{tracker_with_sink, ChannelSink};

    #[test]
    fn test_simulate() {
        let (sink, receiver) = ChannelSink::new("simulate");
        let tracker = tracker_with_sink(64, sink);

        let ran = simulate(&WorkScheduler::new(4), 64, Duration::from_micros(5), &tracker).unwrap();

        assert_eq!(ran, 64);
        let events = receiver.collect_until_complete();
        assert!(events.first().is_some_and(|e| !e.is_terminal()));
        assert!(events.last().is_some_and(|e| e.is_terminal()));
    }
}
