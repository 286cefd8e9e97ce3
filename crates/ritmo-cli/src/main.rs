use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ritmo", version, about = "Ritmo Pomodoro CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task queue management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Completed-task history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Visual theme
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Theme { action } => commands::theme::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
