//! Lifecycle state and event types shared by trackers and sinks.

/// Lifecycle of a single tracker.
///
/// Transitions only move forward: `NotStarted -> InProgress -> Finished`.
/// A tracker finished without ever reporting a unit passes through
/// `InProgress` implicitly so that start and complete stay paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    /// No unit reported yet and no UI handle allocated.
    NotStarted,
    /// Start has been delivered; the UI handle is live.
    InProgress,
    /// Complete has been delivered; the UI handle is released.
    Finished,
}

impl LifecycleState {
    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Finished => "Finished",
        }
    }

    /// Check if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A lifecycle callback as observed by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The operation started and a UI handle was requested.
    Started {
        /// Operation label.
        name: String,
    },
    /// Percent complete crossed a whole-percent boundary.
    Updated(u8),
    /// The operation finished and the UI handle was released.
    Completed,
}

impl ProgressEvent {
    /// Check if this is the last event of a lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Percent carried by an update event.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Updated(percent) => Some(*percent),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started { name } => write!(f, "{}: started", name),
            Self::Updated(percent) => write!(f, "{}%", percent),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_state_display() {
        assert_eq!(LifecycleState::InProgress.to_string(), "In progress");
        assert_eq!(LifecycleState::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_lifecycle_state_order() {
        assert!(LifecycleState::NotStarted < LifecycleState::InProgress);
        assert!(LifecycleState::InProgress < LifecycleState::Finished);
        assert!(LifecycleState::Finished.is_terminal());
        assert!(!LifecycleState::InProgress.is_terminal());
    }

    #[test]
    fn test_progress_event_accessors() {
        assert_eq!(ProgressEvent::Updated(42).percent(), Some(42));
        assert_eq!(ProgressEvent::Completed.percent(), None);
        assert!(ProgressEvent::Completed.is_terminal());
        assert!(!ProgressEvent::Updated(100).is_terminal());
    }

    #[test]
    fn test_progress_event_display() {
        let started = ProgressEvent::Started { name: "Blur".into() };
        assert_eq!(started.to_string(), "Blur: started");
        assert_eq!(ProgressEvent::Updated(57).to_string(), "57%");
    }
}
