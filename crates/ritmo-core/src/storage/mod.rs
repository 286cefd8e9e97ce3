//! Persistence: key-value blob store and the data directory.

mod store;

pub use store::{
    Store, KEY_COMPLETED_TASKS, KEY_SESSION, KEY_SETTINGS, KEY_TASKS, KEY_THEME,
};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Visual theme. Stored as its own blob so frontends can apply it before
/// anything else loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("expected light or dark, got '{other}'"),
            }),
        }
    }
}

/// Returns `~/.config/ritmo[-dev]/` based on RITMO_ENV, or the directory
/// named by RITMO_DATA_DIR when set (used by tests).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(dir) = std::env::var("RITMO_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("RITMO_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("ritmo-dev")
        } else {
            base_dir.join("ritmo")
        }
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
