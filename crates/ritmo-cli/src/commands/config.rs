//! Settings commands.
//!
//! `set` goes through the engine so every settings change re-baselines the
//! countdown and the cycle counters, the same as saving from a settings
//! form. Values are parsed against the existing field's JSON type, so a
//! bad value is rejected before anything is touched.

use clap::Subcommand;
use ritmo_core::{Settings, Store};

use super::{confirm, load_engine, render_events, save_engine, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full settings as JSON
    Show,
    /// Print a single settings field
    Get { key: String },
    /// Set a settings field (numeric floors clamp to 1)
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Reset all settings to defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(action: ConfigAction) -> CliResult {
    let store = Store::open()?;

    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&store.load_settings()?)?);
        }
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(store.load_settings()?)?;
            match json.get(&key) {
                Some(serde_json::Value::String(s)) => println!("{s}"),
                Some(other) => println!("{other}"),
                None => return Err(format!("unknown settings key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            if key == "version" {
                return Err("the version tag is managed automatically".into());
            }
            let mut engine = load_engine(&store)?;
            let mut json = serde_json::to_value(engine.settings())?;
            let fields = json
                .as_object_mut()
                .ok_or("settings are not a JSON object")?;
            let existing = fields
                .get(&key)
                .ok_or_else(|| format!("unknown settings key: {key}"))?;
            let parsed = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| format!("{key} expects true or false, got '{value}'"))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::from(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("{key} expects a whole number, got '{value}'"))?,
                ),
                _ => serde_json::Value::String(value),
            };
            fields.insert(key, parsed);
            let settings: Settings = serde_json::from_value(json)?;
            render_events(&engine.update_settings(settings));
            save_engine(&store, &engine)?;
            println!("{}", serde_json::to_string_pretty(engine.settings())?);
        }
        ConfigAction::Reset { yes } => {
            if !confirm("Reset all settings to defaults?", yes)? {
                println!("Aborted.");
                return Ok(());
            }
            let mut engine = load_engine(&store)?;
            render_events(&engine.update_settings(Settings::default()));
            save_engine(&store, &engine)?;
        }
    }

    Ok(())
}
