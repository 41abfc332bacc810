//! Lifecycle sinks: where a tracker's start/update/complete callbacks land.

use super::facade::{ProgressFacade, ProgressHandle, SCALE_MAX};

/// Receiver of a tracker's three lifecycle callbacks.
///
/// The threshold engine guarantees that `on_start` is delivered once before
/// any `on_update`, that update percents strictly increase, and that
/// `on_complete` is delivered once, last. Implementations must not block:
/// callbacks run on producer threads. They also must not re-enter the
/// tracker that drives them (report units or call `finished()`): callbacks
/// run under the tracker's state lock, so re-entry deadlocks.
pub trait LifecycleSink: Send {
    /// The tracker left `NotStarted`.
    fn on_start(&mut self);

    /// Percent complete crossed a whole-percent boundary.
    fn on_update(&mut self, percent: u8);

    /// The tracker finished.
    fn on_complete(&mut self);
}

/// Binds lifecycle callbacks to a handle obtained from a [`ProgressFacade`].
///
/// The handle is requested on start and released on complete. After release
/// the reference is dropped, so a stray callback can never reach a disposed
/// handle.
pub struct FacadeSink<F: ProgressFacade> {
    facade: F,
    operation_name: String,
    handle: Option<F::Handle>,
}

impl<F: ProgressFacade> FacadeSink<F> {
    /// Create a sink for `operation_name` that will open handles on `facade`.
    pub fn new(facade: F, operation_name: impl Into<String>) -> Self {
        Self {
            facade,
            operation_name: operation_name.into(),
            handle: None,
        }
    }

    /// Operation label passed to the facade.
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// Check if a UI handle is currently held.
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }
}

impl<F: ProgressFacade> LifecycleSink for FacadeSink<F> {
    fn on_start(&mut self) {
        if self.handle.is_some() {
            log::warn!("'{}' already has a progress handle", self.operation_name);
            return;
        }
        self.handle = Some(self.facade.start_progress(&self.operation_name, SCALE_MAX));
    }

    fn on_update(&mut self, percent: u8) {
        match self.handle {
            Some(ref handle) => handle.update_progress(percent),
            None => log::debug!(
                "Ignoring {}% for '{}': no live handle",
                percent,
                self.operation_name
            ),
        }
    }

    fn on_complete(&mut self) {
        match self.handle.take() {
            Some(handle) => handle.stop_progress_on_affinity_thread(),
            None => log::debug!("Ignoring completion of '{}': no live handle", self.operation_name),
        }
    }
}
