//! Scaled reporting of a nested operation into a parent tracker.

use std::sync::{Mutex, PoisonError};

use super::tracker::ProgressTracker;

/// Relative tolerance under which a scaled count snaps to the nearest whole
/// unit instead of flooring.
const SNAP_TOLERANCE: f64 = 1e-9;

struct SubtaskState {
    /// Subtask units reported so far.
    reported: u64,
    /// Parent units forwarded so far.
    forwarded: u64,
    finished: bool,
}

/// Reports a sub-operation's units into a parent tracker, scaled by a ratio.
///
/// Used when one step of a larger operation has its own natural unit count,
/// e.g. a filter applied to a downscaled copy that reports per row of the
/// small image while the parent counts rows of the full image.
///
/// Subtask units are counted exactly; the parent receives
/// `floor(reported * parent_units / subtask_units) - forwarded` after each
/// report, so fractions never accumulate rounding error.
///
/// Finishing a subtask never finishes the parent.
pub struct SubtaskTracker<P: ProgressTracker> {
    /// Parent units per `per_units` subtask units.
    parent_units: f64,
    per_units: f64,

    parent: P,

    state: Mutex<SubtaskState>,
}

impl<P: ProgressTracker> SubtaskTracker<P> {
    /// Create a subtask forwarding `ratio` parent units per reported unit.
    /// Negative or non-finite ratios forward nothing.
    pub fn new(ratio: f64, parent: P) -> Self {
        Self::scaled(ratio, 1.0, parent)
    }

    /// Subtask whose `subtask_units` together account for `allocated_units`
    /// of the parent.
    pub fn allocated(allocated_units: i64, subtask_units: f64, parent: P) -> Self {
        Self::scaled(allocated_units as f64, subtask_units, parent)
    }

    fn scaled(parent_units: f64, per_units: f64, parent: P) -> Self {
        let valid = parent_units.is_finite()
            && per_units.is_finite()
            && parent_units > 0.0
            && per_units > 0.0
            && (parent_units / per_units).is_finite();

        let (parent_units, per_units) = if valid {
            (parent_units, per_units)
        } else {
            log::warn!(
                "Invalid subtask ratio {}/{}; nothing will be forwarded",
                parent_units,
                per_units
            );
            (0.0, 1.0)
        };

        Self {
            parent_units,
            per_units,
            parent,
            state: Mutex::new(SubtaskState {
                reported: 0,
                forwarded: 0,
                finished: false,
            }),
        }
    }

    /// Parent units per subtask unit.
    pub fn ratio(&self) -> f64 {
        self.parent_units / self.per_units
    }

    /// The parent tracker.
    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Whole parent units owed for `reported` subtask units.
    fn owed(&self, reported: u64) -> u64 {
        let exact = reported as f64 * self.parent_units / self.per_units;
        let nearest = exact.round();
        if (exact - nearest).abs() <= SNAP_TOLERANCE * nearest.max(1.0) {
            nearest as u64
        } else {
            exact.floor() as u64
        }
    }
}

impl<P: ProgressTracker> ProgressTracker for SubtaskTracker<P> {
    fn units_done(&self, units: i64) {
        if units <= 0 {
            return;
        }

        let delta = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.finished {
                return;
            }
            state.reported = state.reported.saturating_add(units as u64);
            let owed = self.owed(state.reported);
            let delta = owed.saturating_sub(state.forwarded);
            state.forwarded = state.forwarded.max(owed);
            delta
        };

        if delta > 0 {
            self.parent.units_done(i64::try_from(delta).unwrap_or(i64::MAX));
        }
    }

    fn finished(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::channel::ChannelSink;
    use crate::progress::tracker::tracker_with_sink;

    #[test]
    fn test_fractional_units_accumulate() {
        let (sink, receiver) = ChannelSink::new("Resize");
        let parent = tracker_with_sink(10, sink);
        let subtask = SubtaskTracker::new(0.25, parent.clone());

        for _ in 0..3 {
            subtask.unit_done();
        }
        assert_eq!(parent.engine().map(|e| e.completed()), Some(0));

        subtask.unit_done();
        assert_eq!(parent.engine().map(|e| e.completed()), Some(1));
        assert_eq!(receiver.drain_percents(), vec![10]);
    }

    #[test]
    fn test_allocated_ratio() {
        let parent = tracker_with_sink(100, ChannelSink::new("Resize").0);
        let subtask = SubtaskTracker::allocated(40, 80.0, parent.clone());

        assert!((subtask.ratio() - 0.5).abs() < f64::EPSILON);
        subtask.units_done(80);
        assert_eq!(parent.engine().map(|e| e.completed()), Some(40));
    }

    #[test]
    fn test_inexact_ratio_loses_no_units() {
        let parent = tracker_with_sink(1000, ChannelSink::new("Resize").0);
        let subtask = SubtaskTracker::new(0.1, parent.clone());

        for _ in 0..100 {
            subtask.unit_done();
        }
        assert_eq!(parent.engine().map(|e| e.completed()), Some(10));

        let allocated = SubtaskTracker::allocated(10, 100.0, parent.clone());
        for _ in 0..100 {
            allocated.unit_done();
        }
        assert_eq!(parent.engine().map(|e| e.completed()), Some(20));

        let uneven = SubtaskTracker::new(0.29, parent.clone());
        for _ in 0..100 {
            uneven.unit_done();
        }
        assert_eq!(parent.engine().map(|e| e.completed()), Some(49));
    }

    #[test]
    fn test_allocated_thirds() {
        let parent = tracker_with_sink(100, ChannelSink::new("Resize").0);
        let subtask = SubtaskTracker::allocated(1, 3.0, parent.clone());

        subtask.unit_done();
        subtask.unit_done();
        assert_eq!(parent.engine().map(|e| e.completed()), Some(0));
        subtask.unit_done();
        assert_eq!(parent.engine().map(|e| e.completed()), Some(1));
    }

    #[test]
    fn test_finish_does_not_finish_parent() {
        let parent = tracker_with_sink(10, ChannelSink::new("Resize").0);
        let subtask = SubtaskTracker::new(1.0, parent.clone());

        subtask.units_done(2);
        subtask.finished();
        subtask.units_done(5);

        assert_eq!(parent.engine().map(|e| e.completed()), Some(2));
        assert!(!parent.state().is_terminal());
    }

    #[test]
    fn test_invalid_ratio_forwards_nothing() {
        let parent = tracker_with_sink(10, ChannelSink::new("Resize").0);

        for ratio in [-1.0, f64::NAN, f64::INFINITY] {
            let subtask = SubtaskTracker::new(ratio, parent.clone());
            subtask.units_done(100);
            assert_eq!(subtask.ratio(), 0.0);
        }

        assert_eq!(parent.engine().map(|e| e.completed()), Some(0));
    }
}
