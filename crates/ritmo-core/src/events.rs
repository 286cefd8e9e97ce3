//! Engine events.
//!
//! Every state change in the engine produces `Event` values. The CLI (or
//! any other frontend) renders them; side effects like the completion
//! sound cue are fire-and-forget signals the frontend may ignore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::Mode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A countdown reached zero (or was skipped, which is equivalent).
    CycleCompleted {
        mode: Mode,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Mode-specific completion chime. Best-effort on the frontend:
    /// playback failure is logged, never fatal.
    SoundCue {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// Session counter exceeded the configured count and wrapped to 1.
    SessionsWrapped {
        session_count: u32,
        at: DateTime<Utc>,
    },
    TaskStarted {
        id: Uuid,
        name: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        id: Uuid,
        name: String,
        at: DateTime<Utc>,
    },
    /// Auto-switch bound the next incomplete task.
    TaskSwitched {
        id: Uuid,
        name: String,
        at: DateTime<Utc>,
    },
    /// Free-text user-visible notice.
    Notice {
        message: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        cycle_display: String,
        session_display: String,
        task_driven: bool,
        active_task: Option<Uuid>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub(crate) fn notice(message: impl Into<String>) -> Self {
        Event::Notice {
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Text to surface to the user, if this event carries any.
    pub fn message(&self) -> Option<String> {
        match self {
            Event::Notice { message, .. } => Some(message.clone()),
            Event::SessionsWrapped { .. } => {
                Some("Sessions complete! Restarting from the first session.".to_string())
            }
            _ => None,
        }
    }
}
