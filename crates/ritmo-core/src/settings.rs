//! Versioned user settings.
//!
//! Settings are persisted as a JSON blob tagged with a version string. A
//! version mismatch on load discards the saved blob and reinitializes
//! defaults (followed by an immediate re-save at the storage layer).

use serde::{Deserialize, Serialize};

/// Current settings schema version. Bump on incompatible changes.
pub const SETTINGS_VERSION: &str = "1.0.1";

/// User-configurable timer settings.
///
/// All numeric fields are clamped to >= 1 by [`Settings::normalize`],
/// which every save path must call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: String,
    /// Work interval length in minutes.
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    /// Work cycles per session in the free-running regime.
    #[serde(default = "default_cycles_per_session")]
    pub cycles_per_session: u32,
    /// Number of sessions before the session counter wraps.
    #[serde(default = "default_session_count")]
    pub session_count: u32,
    /// Skip confirmation and auto-start the next mode on expiry.
    #[serde(default)]
    pub auto_transitions: bool,
    #[serde(default)]
    pub repeat_sessions: bool,
    /// Mark the active task complete automatically when its quota is met.
    #[serde(default)]
    pub auto_check_tasks: bool,
    /// Advance to the next incomplete task automatically.
    #[serde(default)]
    pub auto_switch_tasks: bool,
    #[serde(default)]
    pub notify_on_task_complete: bool,
    #[serde(default = "default_true")]
    pub show_task_descriptions: bool,
}

fn default_version() -> String {
    SETTINGS_VERSION.to_string()
}
fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_cycles_per_session() -> u32 {
    4
}
fn default_session_count() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles_per_session: default_cycles_per_session(),
            session_count: default_session_count(),
            auto_transitions: false,
            repeat_sessions: false,
            auto_check_tasks: false,
            auto_switch_tasks: false,
            notify_on_task_complete: false,
            show_task_descriptions: true,
        }
    }
}

impl Settings {
    /// Clamp every numeric field to its floor of 1 and pin the version
    /// tag. Must be called before persisting.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION.to_string();
        self.work_minutes = self.work_minutes.max(1);
        self.short_break_minutes = self.short_break_minutes.max(1);
        self.long_break_minutes = self.long_break_minutes.max(1);
        self.cycles_per_session = self.cycles_per_session.max(1);
        self.session_count = self.session_count.max(1);
    }

    /// Whether a persisted blob with this version tag is loadable.
    pub fn version_matches(&self) -> bool {
        self.version == SETTINGS_VERSION
    }
}
