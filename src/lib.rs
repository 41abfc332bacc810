//! Unit Progress Library
//!
//! Thread-safe progress tracking for long-running image operations. Producer
//! threads report completed work units at whatever rate they like; a single
//! UI thread receives only whole-percent changes, in order, bracketed by
//! exactly one start and one completion.
//!
//! # Features
//!
//! - **Coalescing**: units that do not change the integer percent cost one
//!   atomic add and never reach the UI
//! - **Ordered lifecycle**: start happens before every update, every update
//!   happens before completion, and nothing fires after completion
//! - **No-op trackers**: a non-positive total yields an inert tracker, so
//!   callers never branch on whether tracking is active
//! - **UI affinity**: UI mutations run on one designated thread, reached
//!   through a fire-and-forget queue
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use unit_progress::{create_tracker, BarFacade, ProgressTracker, UiThread};
//!
//! let ui = UiThread::spawn("progress-ui")?;
//! let facade = BarFacade::new(ui.dispatcher(), unit_progress::config::DEFAULT_TEMPLATE)?;
//!
//! let tracker = create_tracker(height as i64, "Emboss", facade);
//! rows.par_iter_mut().for_each(|row| {
//!     emboss_row(row);
//!     tracker.unit_done();
//! });
//! tracker.finished();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod progress;
pub mod workload;

// Re-export commonly used types
pub use config::Config;
pub use error::{ProgressError, Result};
pub use progress::{
    create_tracker, tracker_with_sink, BarFacade, Dispatcher, LifecycleSink, LifecycleState,
    NullTracker, ProgressFacade, ProgressHandle, ProgressTracker, Tracker, UiThread,
};

/// Library version information.
pub mod version {
    /// Library version string.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Library name.
    pub const NAME: &str = env!("CARGO_PKG_NAME");

    /// Get full version string.
    pub fn full_version() -> String {
        format!("{} {}", NAME, VERSION)
    }
}
