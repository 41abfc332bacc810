//! Callback-based lifecycle sink.

use super::sink::LifecycleSink;

type StartFn = Box<dyn FnMut() + Send>;
type UpdateFn = Box<dyn FnMut(u8) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// A lifecycle sink that invokes closures.
///
/// # Example
///
/// ```rust,ignore
/// use unit_progress::progress::{tracker_with_sink, CallbackSink, ProgressTracker};
///
/// let sink = CallbackSink::new(|percent| println!("{}%", percent))
///     .on_start(|| println!("started"))
///     .on_complete(|| println!("done"));
///
/// let tracker = tracker_with_sink(rows, sink);
/// ```
pub struct CallbackSink {
    /// Update callback.
    update: UpdateFn,

    /// Start callback (optional).
    start: Option<StartFn>,

    /// Completion callback (optional).
    complete: Option<CompleteFn>,
}

impl CallbackSink {
    /// Create a sink calling `update` on every delivered percent.
    pub fn new<F>(update: F) -> Self
    where
        F: FnMut(u8) + Send + 'static,
    {
        Self {
            update: Box::new(update),
            start: None,
            complete: None,
        }
    }

    /// Set a start callback.
    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.start = Some(Box::new(callback));
        self
    }

    /// Set a completion callback.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.complete = Some(Box::new(callback));
        self
    }
}

impl LifecycleSink for CallbackSink {
    fn on_start(&mut self) {
        if let Some(ref mut callback) = self.start {
            callback();
        }
    }

    fn on_update(&mut self, percent: u8) {
        (self.update)(percent);
    }

    fn on_complete(&mut self) {
        if let Some(ref mut callback) = self.complete {
            callback();
        }
    }
}
