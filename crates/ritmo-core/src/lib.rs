//! # Ritmo Core Library
//!
//! Core business logic for the Ritmo Pomodoro timer. All operations are
//! available through this library; the CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Clock**: a countdown state machine driven by caller ticks, one
//!   logical second per tick
//! - **Engine**: the session/cycle orchestrator -- decides which mode
//!   follows each expiry, advances the counters, and drives the optional
//!   active-task binding
//! - **Task queue**: priority-ordered tasks with per-task cycle quotas
//! - **History**: append-only ledger of completed tasks with read-side
//!   views and daily stats
//! - **Storage**: SQLite-backed key-value store of versioned JSON blobs
//!
//! ## Key Components
//!
//! - [`Engine`]: session state machine
//! - [`TaskQueue`]: task management
//! - [`Store`]: persistence
//! - [`Settings`]: versioned configuration

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod mode;
pub mod settings;
pub mod storage;
pub mod task;

pub use clock::{Clock, Tick};
pub use engine::{Engine, SessionState};
pub use error::{CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use history::{CompletedTask, DayStats, History, HistoryFilter, HistorySort};
pub use mode::Mode;
pub use settings::{Settings, SETTINGS_VERSION};
pub use storage::{data_dir, Store, Theme};
pub use task::{Priority, Task, TaskFields, TaskQueue};
