//! Completed-task history commands.

use chrono::{Local, Utc};
use clap::Subcommand;
use ritmo_core::{HistoryFilter, HistorySort, Store};

use super::{confirm, load_engine, render_events, save_engine, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List completed-task records
    List {
        /// all, high, medium or low
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,
        /// date-desc, date-asc, priority-desc or priority-asc
        #[arg(long, default_value = "date-desc")]
        sort: HistorySort,
        /// Print raw JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Aggregate stats for today
    Stats,
    /// Clear every completed-task record
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(action: HistoryAction) -> CliResult {
    let store = Store::open()?;

    match action {
        HistoryAction::List { filter, sort, json } => {
            let history = store.load_history()?;
            let view = history.view(filter, sort);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if view.is_empty() {
                println!("No completed tasks.");
            } else {
                for record in &view {
                    println!(
                        "({}) {} -- {} cycles, completed {}",
                        record.priority,
                        record.name,
                        record.cycles,
                        record
                            .completed_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M")
                    );
                    println!("      {}", record.description);
                }
            }
        }
        HistoryAction::Stats => {
            let history = store.load_history()?;
            let stats = history.stats_for_day(Utc::now().date_naive());
            println!("Today's stats");
            println!("  Completed tasks: {}", stats.completed_tasks);
            println!("  Total cycles:    {}", stats.total_cycles);
            println!(
                "  By priority:     high {}, medium {}, low {}",
                stats.high_cycles, stats.medium_cycles, stats.low_cycles
            );
        }
        HistoryAction::Clear { yes } => {
            if !confirm("Clear the history? This removes every record.", yes)? {
                println!("Aborted.");
                return Ok(());
            }
            let mut engine = load_engine(&store)?;
            render_events(&engine.clear_history());
            save_engine(&store, &engine)?;
        }
    }

    Ok(())
}
