//! UI-affinity thread and fire-and-forget dispatch.
//!
//! One designated thread owns every UI mutation. Other threads reach it only
//! through a [`Dispatcher`], which enqueues work and returns at once. A caller
//! on a background thread therefore cannot assume the mutation has run when
//! [`Dispatcher::dispatch`] returns; in particular, stopping a progress handle
//! from a producer thread returns before the handle is torn down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle, ThreadId};

use crate::error::{ProgressError, Result};

/// A boxed UI mutation.
type UiTask = Box<dyn FnOnce() + Send + 'static>;

enum UiMessage {
    Run(UiTask),
    Shutdown,
}

/// Handle for queueing UI mutations from any thread.
///
/// Cheap to clone; every clone targets the same UI thread.
#[derive(Clone)]
pub struct Dispatcher {
    /// Queue feeding the UI thread.
    sender: Sender<UiMessage>,

    /// Identity of the UI thread.
    ui_thread: ThreadId,
}

impl Dispatcher {
    /// Check if the calling thread is the UI-affinity thread.
    pub fn is_on_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Run `mutation` on the UI thread.
    ///
    /// Runs in place when already on the UI thread. Otherwise the mutation is
    /// queued and this returns without waiting for it. Failures are never
    /// reported back: if the UI thread has stopped, the mutation is dropped.
    pub fn dispatch<F>(&self, mutation: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_on_ui_thread() {
            mutation();
            return;
        }

        if self.sender.send(UiMessage::Run(Box::new(mutation))).is_err() {
            log::debug!("UI thread has stopped; dropping queued mutation");
        }
    }

    /// Block until every mutation queued before this call has run.
    ///
    /// Not for producer paths. Returns immediately on the UI thread itself.
    pub fn flush(&self) -> Result<()> {
        if self.is_on_ui_thread() {
            return Ok(());
        }

        let (done_tx, done_rx) = mpsc::channel();
        let barrier: UiTask = Box::new(move || {
            let _ = done_tx.send(());
        });

        self.sender
            .send(UiMessage::Run(barrier))
            .map_err(|_| ProgressError::UiThread("UI thread has stopped".into()))?;

        done_rx
            .recv()
            .map_err(|_| ProgressError::UiThread("UI thread stopped before flush".into()))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ui_thread", &self.ui_thread)
            .finish()
    }
}

/// The designated UI-affinity thread.
///
/// Mutations run in the order they were queued. A panicking mutation is
/// logged and does not take the thread down. Dropping the `UiThread` drains
/// the queue and joins the thread.
pub struct UiThread {
    /// Dispatcher bound to this thread.
    dispatcher: Dispatcher,

    /// Join handle, taken on shutdown.
    handle: Option<JoinHandle<()>>,
}

impl UiThread {
    /// Spawn a new UI thread with the given name.
    pub fn spawn(name: &str) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<UiMessage>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_ui_loop(receiver))
            .map_err(|e| ProgressError::UiThread(format!("failed to spawn '{}': {}", name, e)))?;

        log::debug!("Spawned UI thread '{}'", name);

        Ok(Self {
            dispatcher: Dispatcher {
                sender,
                ui_thread: handle.thread().id(),
            },
            handle: Some(handle),
        })
    }

    /// Get a dispatcher targeting this thread.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Drain pending mutations, then stop and join the thread.
    ///
    /// Mutations queued after this call are dropped.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let _ = self.dispatcher.sender.send(UiMessage::Shutdown);
        handle
            .join()
            .map_err(|_| ProgressError::UiThread("UI thread panicked".into()))
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{}", e);
        }
    }
}

fn run_ui_loop(receiver: Receiver<UiMessage>) {
    while let Ok(message) = receiver.recv() {
        match message {
            UiMessage::Run(task) => {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    log::warn!("UI mutation panicked; continuing");
                }
            }
            UiMessage::Shutdown => break,
        }
    }
    log::debug!("UI thread exiting");
}
