//! Channel-based lifecycle sink.
//!
//! Forwards lifecycle callbacks through an MPSC channel, so a consumer on
//! another thread can observe them without touching any UI.

use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use super::event::ProgressEvent;
use super::sink::LifecycleSink;

/// Channel-based lifecycle sink.
///
/// # Example
///
/// ```rust,ignore
/// use unit_progress::progress::{tracker_with_sink, ChannelSink};
/// use std::thread;
///
/// let (sink, receiver) = ChannelSink::new("Crystallize");
///
/// thread::spawn(move || {
///     for event in receiver.iter() {
///         println!("{}", event);
///         if event.is_terminal() {
///             break;
///         }
///     }
/// });
///
/// let tracker = tracker_with_sink(rows, sink);
/// ```
pub struct ChannelSink {
    /// Operation label carried by the start event.
    name: String,

    /// Channel sender for lifecycle events.
    sender: Sender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a new channel sink.
    ///
    /// Returns the sink and a receiver for its events.
    pub fn new(name: impl Into<String>) -> (Self, ProgressReceiver) {
        let (sender, receiver) = mpsc::channel();

        let sink = Self {
            name: name.into(),
            sender,
        };

        (sink, ProgressReceiver { receiver })
    }

    fn send(&self, event: ProgressEvent) {
        // Ignore send errors (receiver may have been dropped)
        let _ = self.sender.send(event);
    }
}

impl LifecycleSink for ChannelSink {
    fn on_start(&mut self) {
        self.send(ProgressEvent::Started {
            name: self.name.clone(),
        });
    }

    fn on_update(&mut self, percent: u8) {
        self.send(ProgressEvent::Updated(percent));
    }

    fn on_complete(&mut self) {
        self.send(ProgressEvent::Completed);
    }
}

/// Receiver for lifecycle events.
///
/// Wraps an MPSC receiver with convenience methods.
pub struct ProgressReceiver {
    receiver: Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Block and wait for the next event.
    pub fn recv(&self) -> Result<ProgressEvent, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Result<ProgressEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Wait for an event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ProgressEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Iterate over all received events.
    pub fn iter(&self) -> impl Iterator<Item = ProgressEvent> + '_ {
        self.receiver.iter()
    }

    /// Non-blocking iterator over available events.
    pub fn try_iter(&self) -> impl Iterator<Item = ProgressEvent> + '_ {
        self.receiver.try_iter()
    }

    /// Collect events until the completion event.
    ///
    /// Blocks until `Completed` arrives or the sink is dropped.
    pub fn collect_until_complete(&self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.recv() {
            let is_terminal = event.is_terminal();
            events.push(event);
            if is_terminal {
                break;
            }
        }
        events
    }

    /// Percents of all update events currently queued, in delivery order.
    pub fn drain_percents(&self) -> Vec<u8> {
        self.try_iter().filter_map(|event| event.percent()).collect()
    }
}
