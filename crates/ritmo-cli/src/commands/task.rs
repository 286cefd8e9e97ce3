//! Task queue commands.
//!
//! Tasks are addressed by their 1-based list number, resolved to the
//! task's stable id before any mutation so a concurrent re-sort cannot
//! change which task is meant.

use clap::Subcommand;
use ritmo_core::{Priority, Store, Task, TaskFields};

use super::{
    confirm, load_engine, print_task_list, render_events, resolve_task, save_engine, CliResult,
};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the queue
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Work-cycle quota (at least 1)
        #[arg(long, default_value = "1")]
        cycles: u32,
        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// List the queue in its current order
    List {
        /// Print raw JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Edit a task by its list number
    Edit {
        number: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cycles: Option<u32>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Delete a task by its list number
    Delete { number: usize },
    /// Toggle a task's completion flag
    Toggle { number: usize },
    /// Bind a task and start counting work cycles against its quota
    Start {
        number: usize,
        /// Skip the interrupt confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Move a task to a new position (manual order, until the next re-sort)
    Move { from: usize, to: usize },
}

pub fn run(action: TaskAction) -> CliResult {
    let store = Store::open()?;
    let mut engine = load_engine(&store)?;

    match action {
        TaskAction::Add {
            name,
            description,
            cycles,
            priority,
        } => {
            let task = Task::new(&name, description.as_deref(), cycles, priority)?;
            engine.add_task(task);
            print_task_list(&engine);
        }
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.queue().tasks())?);
            } else {
                print_task_list(&engine);
            }
            return Ok(());
        }
        TaskAction::Edit {
            number,
            name,
            description,
            cycles,
            priority,
        } => {
            let id = resolve_task(&engine, number)?;
            engine.edit_task(
                id,
                TaskFields {
                    name,
                    description,
                    cycles,
                    priority,
                },
            )?;
            print_task_list(&engine);
        }
        TaskAction::Delete { number } => {
            let id = resolve_task(&engine, number)?;
            engine.delete_task(id)?;
            print_task_list(&engine);
        }
        TaskAction::Toggle { number } => {
            let id = resolve_task(&engine, number)?;
            render_events(&engine.toggle_task(id)?);
            print_task_list(&engine);
        }
        TaskAction::Start { number, yes } => {
            let id = resolve_task(&engine, number)?;
            if let Some(current) = engine.would_interrupt(id) {
                let prompt = format!(
                    "Task \"{}\" is in progress. Interrupt it and start this one?",
                    current.name
                );
                if !confirm(&prompt, yes)? {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            render_events(&engine.start_task_cycles(id)?);
            println!("{}", engine.cycle_display());
        }
        TaskAction::Move { from, to } => {
            let from = from.checked_sub(1).ok_or("task numbers start at 1")?;
            let to = to.checked_sub(1).ok_or("task numbers start at 1")?;
            engine.move_task(from, to)?;
            print_task_list(&engine);
        }
    }

    save_engine(&store, &engine)?;
    Ok(())
}
