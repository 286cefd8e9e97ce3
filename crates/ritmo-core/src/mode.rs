//! Timer modes and their display parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// The three phases of the Pomodoro rhythm. Exactly one is current at
/// any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Mode::ShortBreak | Mode::LongBreak)
    }

    /// Full countdown duration for this mode under the given settings.
    pub fn duration_secs(&self, settings: &Settings) -> u64 {
        let minutes = match self {
            Mode::Work => settings.work_minutes,
            Mode::ShortBreak => settings.short_break_minutes,
            Mode::LongBreak => settings.long_break_minutes,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// User-visible notice shown when this mode begins. Work intervals
    /// start silently.
    pub fn entry_notice(&self) -> Option<&'static str> {
        match self {
            Mode::Work => None,
            Mode::ShortBreak => Some("Work interval complete! Starting a short break."),
            Mode::LongBreak => Some("Session complete! Starting a long break."),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
