//! UI facade contract and the terminal progress-bar implementation.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::DEFAULT_TEMPLATE;
use crate::error::{ProgressError, Result};

use super::dispatch::Dispatcher;

/// Upper bound of the scale every progress handle is sized to.
pub const SCALE_MAX: u64 = 100;

/// A live UI progress indicator.
///
/// Handles are owned by exactly one tracker between start and complete.
pub trait ProgressHandle: Send + 'static {
    /// Show `percent` (0..=100) on the indicator.
    fn update_progress(&self, percent: u8);

    /// Stop and tear down the indicator. Must run on the UI thread.
    fn stop_progress(&self);

    /// Stop the indicator from any thread without blocking.
    ///
    /// Returns before the indicator is actually torn down when called off the
    /// UI thread.
    fn stop_progress_on_affinity_thread(&self);
}

/// Factory for progress handles, provided by the UI layer.
pub trait ProgressFacade: Send + Sync {
    /// Handle type produced by this facade.
    type Handle: ProgressHandle;

    /// Create an indicator labelled `operation_name` spanning `0..=scale_max`.
    fn start_progress(&self, operation_name: &str, scale_max: u64) -> Self::Handle;
}

/// Terminal progress bars drawn by `indicatif`.
///
/// Bars are created on the calling thread but never drawn there: every
/// visible mutation goes through the [`Dispatcher`] to the UI thread.
#[derive(Clone)]
pub struct BarFacade {
    /// Route to the UI thread.
    dispatcher: Dispatcher,

    /// Style applied to every bar.
    style: ProgressStyle,

    /// Draw to stderr, or keep bars hidden.
    visible: bool,
}

impl BarFacade {
    /// Create a facade drawing to stderr with the given `indicatif` template.
    pub fn new(dispatcher: Dispatcher, template: &str) -> Result<Self> {
        let style = ProgressStyle::with_template(template)
            .map_err(|e| ProgressError::Config(format!("invalid progress template: {}", e)))?
            .progress_chars("=> ");

        Ok(Self {
            dispatcher,
            style,
            visible: true,
        })
    }

    /// Create a facade whose bars never draw.
    pub fn hidden(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            style: ProgressStyle::with_template(DEFAULT_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            visible: false,
        }
    }
}

impl ProgressFacade for BarFacade {
    type Handle = BarHandle;

    fn start_progress(&self, operation_name: &str, scale_max: u64) -> BarHandle {
        let target = if self.visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(scale_max), target);
        bar.set_style(self.style.clone());

        let handle = BarHandle {
            bar,
            dispatcher: self.dispatcher.clone(),
        };

        let bar = handle.bar.clone();
        let label = operation_name.to_string();
        self.dispatcher.dispatch(move || {
            bar.set_message(label);
            bar.tick();
        });

        handle
    }
}

/// Handle to a single `indicatif` bar.
#[derive(Clone)]
pub struct BarHandle {
    bar: ProgressBar,
    dispatcher: Dispatcher,
}

impl BarHandle {
    /// Position currently shown by the bar.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Check if the bar has been stopped.
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl ProgressHandle for BarHandle {
    fn update_progress(&self, percent: u8) {
        let bar = self.bar.clone();
        let position = u64::from(percent).min(SCALE_MAX);
        self.dispatcher.dispatch(move || bar.set_position(position));
    }

    fn stop_progress(&self) {
        if !self.dispatcher.is_on_ui_thread() {
            log::debug!("stop_progress called off the UI thread");
        }
        self.bar.finish();
    }

    fn stop_progress_on_affinity_thread(&self) {
        let handle = self.clone();
        self.dispatcher.dispatch(move || handle.stop_progress());
    }
}
