//! Visual theme commands.

use clap::Subcommand;
use ritmo_core::Store;

use super::CliResult;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

pub fn run(action: ThemeAction) -> CliResult {
    let store = Store::open()?;
    match action {
        ThemeAction::Show => println!("{}", store.load_theme()?),
        ThemeAction::Toggle => {
            let theme = store.load_theme()?.toggle();
            store.save_theme(theme)?;
            println!("{theme}");
        }
    }
    Ok(())
}
