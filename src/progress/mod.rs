//! Progress tracking and update throttling.
//!
//! Producers, often many background threads, report completed work units at
//! high rates. This module turns that stream into a short, strictly
//! increasing sequence of whole-percent updates delivered to a single UI
//! thread:
//!
//! - [`ThresholdEngine`] counts units and only calls its sink when the integer
//!   percent rises, with start/update/complete each ordered and paired
//! - [`FacadeSink`] binds those callbacks to a handle from a [`ProgressFacade`]
//! - [`NullTracker`] is handed out when there is nothing to track
//! - [`Dispatcher`] moves UI mutations onto the [`UiThread`] without blocking
//!
//! # Example
//!
//! ```rust,ignore
//! use unit_progress::progress::{create_tracker, BarFacade, ProgressTracker, UiThread};
//!
//! let ui = UiThread::spawn("progress-ui")?;
//! let facade = BarFacade::new(ui.dispatcher(), unit_progress::config::DEFAULT_TEMPLATE)?;
//!
//! let tracker = create_tracker(rows as i64, "Motion Blur", facade);
//! for row in 0..rows {
//!     blur_row(row);
//!     tracker.unit_done();
//! }
//! tracker.finished();
//!
//! ui.shutdown()?;
//! ```

mod callback;
mod channel;
mod dispatch;
mod engine;
mod event;
mod facade;
mod sink;
mod subtask;
mod tracker;

pub use callback::CallbackSink;
pub use channel::{ChannelSink, ProgressReceiver};
pub use dispatch::{Dispatcher, UiThread};
pub use engine::{percent_of, ThresholdEngine};
pub use event::{LifecycleState, ProgressEvent};
pub use facade::{BarFacade, BarHandle, ProgressFacade, ProgressHandle, SCALE_MAX};
pub use sink::{FacadeSink, LifecycleSink};
pub use subtask::SubtaskTracker;
pub use tracker::{create_tracker, tracker_with_sink, NullTracker, ProgressTracker, Tracker};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_bar_tracker_end_to_end() {
        let ui = UiThread::spawn("test-ui").unwrap();
        let dispatcher = ui.dispatcher();
        let facade = BarFacade::hidden(dispatcher.clone());

        let tracker = create_tracker(50, "Crystallize", facade);
        let workers: Vec<_> = (0..5)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        tracker.unit_done();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        tracker.finished();
        // Calls after finishing are accepted and ignored.
        tracker.unit_done();
        tracker.finished();

        dispatcher.flush().unwrap();
        assert_eq!(tracker.state(), LifecycleState::Finished);
        ui.shutdown().unwrap();
    }

    #[test]
    fn test_callback_sink_sequence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let start_log = log.clone();
        let update_log = log.clone();
        let complete_log = log.clone();

        let sink = CallbackSink::new(move |percent| {
            update_log.lock().unwrap().push(format!("{}", percent));
        })
        .on_start(move || start_log.lock().unwrap().push("start".into()))
        .on_complete(move || complete_log.lock().unwrap().push("complete".into()));

        let tracker = tracker_with_sink(7, sink);
        for _ in 0..7 {
            tracker.unit_done();
        }
        tracker.finished();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "14", "28", "42", "57", "71", "85", "100", "complete"]
        );
    }

    #[test]
    fn test_finished_without_units_via_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let start_log = log.clone();
        let complete_log = log.clone();

        let sink = CallbackSink::new(|_| {})
            .on_start(move || start_log.lock().unwrap().push("start"))
            .on_complete(move || complete_log.lock().unwrap().push("complete"));

        let tracker = tracker_with_sink(1000, sink);
        tracker.finished();

        assert_eq!(*log.lock().unwrap(), vec!["start", "complete"]);
    }
}
