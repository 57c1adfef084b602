//! Bridge settings file commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::cli::output::{OutputFormat, print_formatted, print_success};
use crate::settings::AppSettings;

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the settings in effect
    Show,

    /// Show settings file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct SettingsPathResult {
    path: String,
    exists: bool,
}

pub async fn run(
    command: SettingsCommands,
    settings: &AppSettings,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        SettingsCommands::Show => show(settings, format),
        SettingsCommands::Path => path(format),
        SettingsCommands::Init { force } => init(force, quiet),
    }
}

fn show(settings: &AppSettings, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
        OutputFormat::Text => println!("{}", toml::to_string_pretty(settings)?),
    }
    Ok(())
}

fn path(format: OutputFormat) -> Result<()> {
    let path = AppSettings::settings_path()?;
    let result = SettingsPathResult {
        exists: path.exists(),
        path: path.display().to_string(),
    };

    print_formatted(&result, format, |r| {
        if r.exists {
            r.path.clone()
        } else {
            format!("{} (not created yet)", r.path)
        }
    });
    Ok(())
}

fn init(force: bool, quiet: bool) -> Result<()> {
    let path = AppSettings::settings_path()?;
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }

    AppSettings::default().save()?;
    print_success(&format!("Wrote default settings to {}", path.display()), quiet);
    Ok(())
}
