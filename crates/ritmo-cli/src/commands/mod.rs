//! CLI command implementations.
//!
//! Each invocation loads the persisted blobs plus the session snapshot the
//! previous invocation left behind, rebuilds the engine, applies one
//! command and saves everything back.

pub mod config;
pub mod history;
pub mod task;
pub mod theme;
pub mod timer;

use std::io::{self, Write};

use ritmo_core::{Engine, Event, Store};
use uuid::Uuid;

pub(crate) type CliResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn load_engine(store: &Store) -> Result<Engine, Box<dyn std::error::Error>> {
    let settings = store.load_settings()?;
    let tasks = store.load_tasks()?;
    let history = store.load_history()?;
    Ok(match store.load_session()? {
        Some(state) => Engine::with_state(settings, tasks, history, state),
        None => Engine::new(settings, tasks, history),
    })
}

/// Persist every blob the engine may have touched.
pub(crate) fn save_engine(store: &Store, engine: &Engine) -> CliResult {
    store.save_settings(engine.settings())?;
    store.save_tasks(engine.queue())?;
    store.save_history(engine.history())?;
    store.save_session(engine.state())?;
    Ok(())
}

/// Ask before a destructive action. Declining leaves all state unchanged.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Terminal bell as the completion cue. Best-effort: failure is logged.
pub(crate) fn sound_cue() {
    let mut out = io::stdout();
    if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
        log::warn!("could not play completion cue: {e}");
    }
}

pub(crate) fn render_events(events: &[Event]) {
    for event in events {
        match event {
            Event::SoundCue { .. } => sound_cue(),
            Event::TimerStarted {
                mode,
                remaining_secs,
                ..
            } => println!("{mode} timer running, {} remaining", format_secs(*remaining_secs)),
            Event::TimerPaused { remaining_secs, .. } => {
                println!("Paused with {} remaining", format_secs(*remaining_secs));
            }
            Event::ModeChanged { mode, .. } => println!("Mode: {mode}"),
            Event::TaskStarted { .. } | Event::TaskSwitched { .. } => {}
            other => {
                if let Some(message) = other.message() {
                    println!("{message}");
                }
            }
        }
    }
}

pub(crate) fn format_secs(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Resolve a 1-based list number to the stable task id it currently names.
pub(crate) fn resolve_task(engine: &Engine, number: usize) -> Result<Uuid, Box<dyn std::error::Error>> {
    let index = number
        .checked_sub(1)
        .ok_or("task numbers start at 1")?;
    engine
        .queue()
        .get(index)
        .map(|t| t.id)
        .ok_or_else(|| format!("no task #{number}, the list has {}", engine.queue().len()).into())
}

pub(crate) fn print_task_list(engine: &Engine) {
    if engine.queue().is_empty() {
        println!("No tasks.");
        return;
    }
    let show_descriptions = engine.settings().show_task_descriptions;
    for (i, task) in engine.queue().tasks().iter().enumerate() {
        let check = if task.completed { "x" } else { " " };
        let active = if engine.state().active_task == Some(task.id) {
            " *"
        } else {
            ""
        };
        println!(
            "{:>2}. [{check}] ({}) {} -- {} cycles{active}",
            i + 1,
            task.priority,
            task.name,
            task.cycles
        );
        if show_descriptions {
            println!("      {}", task.description);
        }
    }
}
