//! Producer-facing tracker interface and construction factory.

use std::sync::Arc;

use super::engine::ThresholdEngine;
use super::event::LifecycleState;
use super::facade::ProgressFacade;
use super::sink::{FacadeSink, LifecycleSink};

/// Interface used by producers to report completed work units.
///
/// All methods are non-blocking with respect to the UI and safe to call
/// concurrently from any number of threads. None of them can fail.
///
/// # Example
///
/// ```rust,ignore
/// use unit_progress::progress::{create_tracker, ProgressTracker};
///
/// let tracker = create_tracker(height as i64, "Kuwahara", facade);
/// rows.par_iter_mut().for_each(|row| {
///     filter_row(row);
///     tracker.unit_done();
/// });
/// tracker.finished();
/// ```
pub trait ProgressTracker: Send + Sync {
    /// Report one completed unit.
    fn unit_done(&self) {
        self.units_done(1);
    }

    /// Report `units` completed units. Non-positive values are ignored.
    fn units_done(&self, units: i64);

    /// Finish tracking: guarantees a final 100% and releases the UI handle.
    /// Calling it again does nothing.
    fn finished(&self);
}

/// A tracker that does nothing.
///
/// Selected whenever there is no meaningful total, so callers never need to
/// branch on whether tracking is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl ProgressTracker for NullTracker {
    fn unit_done(&self) {}
    fn units_done(&self, _units: i64) {}
    fn finished(&self) {}
}

impl<S: LifecycleSink> ProgressTracker for ThresholdEngine<S> {
    fn unit_done(&self) {
        self.add_units(1);
    }

    fn units_done(&self, units: i64) {
        if units > 0 {
            self.add_units(units as u64);
        }
    }

    fn finished(&self) {
        self.finish();
    }
}

impl<T: ProgressTracker + ?Sized> ProgressTracker for Arc<T> {
    fn unit_done(&self) {
        (**self).unit_done();
    }

    fn units_done(&self, units: i64) {
        (**self).units_done(units);
    }

    fn finished(&self) {
        (**self).finished();
    }
}

/// A tracker as handed out by the factories: either inert or backed by a
/// shared [`ThresholdEngine`].
///
/// Cloning is cheap and every clone reports into the same engine, so a clone
/// can be moved into each producer thread.
pub enum Tracker<S: LifecycleSink> {
    /// No meaningful total; every call is a no-op.
    Null(NullTracker),
    /// Live tracking.
    Active(Arc<ThresholdEngine<S>>),
}

impl<S: LifecycleSink> Tracker<S> {
    /// The inert variant.
    pub fn null() -> Self {
        Self::Null(NullTracker)
    }

    /// Check if this tracker reports anywhere.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Engine behind an active tracker.
    pub fn engine(&self) -> Option<&ThresholdEngine<S>> {
        match self {
            Self::Null(_) => None,
            Self::Active(engine) => Some(engine),
        }
    }

    /// Lifecycle state; the inert variant reports `NotStarted` forever.
    pub fn state(&self) -> LifecycleState {
        self.engine()
            .map_or(LifecycleState::NotStarted, ThresholdEngine::state)
    }
}

impl<S: LifecycleSink> Clone for Tracker<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Null(null) => Self::Null(*null),
            Self::Active(engine) => Self::Active(Arc::clone(engine)),
        }
    }
}

impl<S: LifecycleSink> ProgressTracker for Tracker<S> {
    fn unit_done(&self) {
        match self {
            Self::Null(null) => null.unit_done(),
            Self::Active(engine) => engine.unit_done(),
        }
    }

    fn units_done(&self, units: i64) {
        match self {
            Self::Null(null) => null.units_done(units),
            Self::Active(engine) => engine.units_done(units),
        }
    }

    fn finished(&self) {
        match self {
            Self::Null(null) => null.finished(),
            Self::Active(engine) => engine.finished(),
        }
    }
}

impl<S: LifecycleSink> std::fmt::Debug for Tracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null(_) => write!(f, "Tracker::Null"),
            Self::Active(engine) => f
                .debug_struct("Tracker::Active")
                .field("total", &engine.total())
                .field("completed", &engine.completed())
                .field("last_reported", &engine.last_reported())
                .finish(),
        }
    }
}

/// Create a tracker for `total_units` units reporting into `sink`.
///
/// Returns the inert variant when `total_units <= 0`; the sink is then
/// dropped without ever being called.
pub fn tracker_with_sink<S: LifecycleSink>(total_units: i64, sink: S) -> Tracker<S> {
    if total_units <= 0 {
        log::debug!("No units to track ({}); using a null tracker", total_units);
        return Tracker::null();
    }
    Tracker::Active(Arc::new(ThresholdEngine::new(total_units as u64, sink)))
}

/// Create a tracker for `total_units` units of `operation_name`, drawing
/// through `facade`.
///
/// Returns the inert variant when `total_units <= 0`; the facade is then
/// never touched.
pub fn create_tracker<F: ProgressFacade>(
    total_units: i64,
    operation_name: &str,
    facade: F,
) -> Tracker<FacadeSink<F>> {
    tracker_with_sink(total_units, FacadeSink::new(facade, operation_name))
}
