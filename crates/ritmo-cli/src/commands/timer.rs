//! Timer control commands.

use std::io::Write;
use std::thread;
use std::time::Duration;

use clap::Subcommand;
use ritmo_core::{Event, Store};

use super::{confirm, load_engine, render_events, save_engine, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause, preserving remaining time
    Pause,
    /// Print the current timer state as JSON
    Status,
    /// Force-complete the current cycle
    Skip,
    /// Stop and reset the whole session
    Stop {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Run the countdown in the foreground, one tick per second
    Run {
        /// Stop after this many completed cycles
        #[arg(long, default_value = "1")]
        cycles: u32,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    let store = Store::open()?;
    let mut engine = load_engine(&store)?;

    match action {
        TimerAction::Start => {
            let events = engine.start();
            if events.is_empty() {
                println!("Timer is already running.");
            }
            render_events(&events);
        }
        TimerAction::Pause => {
            let events = engine.pause();
            if events.is_empty() {
                println!("Timer is not running.");
            }
            render_events(&events);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            return Ok(());
        }
        TimerAction::Skip => {
            render_events(&engine.skip());
            println!("{}", engine.cycle_display());
            println!("{}", engine.session_display());
        }
        TimerAction::Stop { yes } => {
            if !confirm("Stop the timer? This resets the session.", yes)? {
                println!("Aborted.");
                return Ok(());
            }
            render_events(&engine.stop());
        }
        TimerAction::Run { cycles } => {
            render_events(&engine.start());
            let mut completed = 0u32;
            while engine.is_running() {
                thread::sleep(Duration::from_secs(1));
                let events = engine.tick();
                if events.is_empty() {
                    print!("\r{}   ", engine.state().clock.format_remaining());
                    std::io::stdout().flush()?;
                    continue;
                }
                println!();
                let finished = events
                    .iter()
                    .any(|e| matches!(e, Event::CycleCompleted { .. }));
                render_events(&events);
                save_engine(&store, &engine)?;
                if finished {
                    completed += 1;
                    if completed >= cycles {
                        break;
                    }
                }
            }
        }
    }

    save_engine(&store, &engine)?;
    Ok(())
}
