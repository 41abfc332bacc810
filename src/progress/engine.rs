//! Work-unit counter and threshold engine.
//!
//! Producers bump an atomic counter. Only when the derived integer percent
//! rises past the last delivered value does a producer take the state lock
//! and call the sink, so any number of units that map to the same percent
//! cost one atomic add each and produce at most one callback.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::event::LifecycleState;
use super::sink::LifecycleSink;

/// Percent complete for `completed` out of `total` units, floored and
/// clamped to 100.
pub fn percent_of(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = u128::from(completed) * 100 / u128::from(total);
    percent.min(100) as u8
}

struct EngineState<S> {
    lifecycle: LifecycleState,
    last_reported: u8,
    sink: S,
}

/// Tracks completed units against a fixed total and drives a
/// [`LifecycleSink`] through start, update and complete.
///
/// All methods take `&self` and are safe to call from any number of threads.
/// Sink callbacks are serialized under an internal lock, which is what keeps
/// delivered percents strictly increasing and every update ahead of
/// completion.
pub struct ThresholdEngine<S: LifecycleSink> {
    /// Fixed at construction; always positive.
    total: u64,

    /// Raw counter. Never clamped; may exceed `total`.
    completed: AtomicU64,

    /// Mirror of the last delivered percent, for the lock-free fast path.
    last_reported: AtomicU8,

    /// Set once start has been delivered.
    started: AtomicBool,

    /// Set once complete has been delivered.
    finished: AtomicBool,

    state: Mutex<EngineState<S>>,
}

impl<S: LifecycleSink> ThresholdEngine<S> {
    /// Create an engine for `total` units. `total` must be positive;
    /// [`create_tracker`](super::create_tracker) routes other values to the
    /// no-op tracker.
    pub fn new(total: u64, sink: S) -> Self {
        debug_assert!(total > 0, "an active tracker needs a positive total");
        Self {
            total: total.max(1),
            completed: AtomicU64::new(0),
            last_reported: AtomicU8::new(0),
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            state: Mutex::new(EngineState {
                lifecycle: LifecycleState::NotStarted,
                last_reported: 0,
                sink,
            }),
        }
    }

    /// Total units this engine was sized to.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Raw completed-unit counter.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Last percent delivered to the sink.
    pub fn last_reported(&self) -> u8 {
        self.last_reported.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lock().lifecycle
    }

    /// Consume the engine and return its sink.
    pub fn into_sink(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
    }

    /// Record `units` more completed units.
    pub fn add_units(&self, units: u64) {
        if units == 0 || self.finished.load(Ordering::Acquire) {
            return;
        }

        let previous = self
            .completed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                Some(c.saturating_add(units))
            })
            .unwrap_or_else(|c| c);
        let completed = previous.saturating_add(units);
        let percent = percent_of(completed, self.total);

        if self.started.load(Ordering::Acquire)
            && percent <= self.last_reported.load(Ordering::Acquire)
        {
            return;
        }

        let mut state = self.lock();
        match state.lifecycle {
            LifecycleState::Finished => return,
            LifecycleState::NotStarted => {
                state.lifecycle = LifecycleState::InProgress;
                log::debug!("Progress started ({} units)", self.total);
                state.sink.on_start();
                self.started.store(true, Ordering::Release);
            }
            LifecycleState::InProgress => {}
        }

        if percent > state.last_reported {
            state.last_reported = percent;
            self.last_reported.store(percent, Ordering::Release);
            state.sink.on_update(percent);
        }
    }

    /// Drive the lifecycle to `Finished`.
    ///
    /// Delivers start if it never fired, then 100% if not yet delivered,
    /// then complete. A second call does nothing.
    pub fn finish(&self) {
        let mut state = self.lock();
        if state.lifecycle == LifecycleState::Finished {
            return;
        }

        if state.lifecycle == LifecycleState::NotStarted {
            state.lifecycle = LifecycleState::InProgress;
            state.sink.on_start();
            self.started.store(true, Ordering::Release);
        }

        if state.last_reported < 100 {
            state.last_reported = 100;
            self.last_reported.store(100, Ordering::Release);
            state.sink.on_update(100);
        }

        self.completed.fetch_max(self.total, Ordering::AcqRel);
        state.lifecycle = LifecycleState::Finished;
        self.finished.store(true, Ordering::Release);
        state.sink.on_complete();

        log::debug!(
            "Progress finished ({}/{} units reported)",
            self.completed(),
            self.total
        );
    }

    fn lock(&self) -> MutexGuard<'_, EngineState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
