//! CLI module for miner-bridge
//!
//! Drives the event bridge and the settings layer against a scripted backend.

mod commands;
mod output;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

use crate::settings::AppSettings;

/// miner-bridge - backend event bridge for the desktop mining client
#[derive(Parser, Debug)]
#[command(name = "miner-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed recorded backend events through a live listener
    Replay(commands::replay::ReplayArgs),

    /// Apply settings changes optimistically against the scripted backend
    Set(commands::set::SetArgs),

    /// Bridge settings file management
    Settings {
        #[command(subcommand)]
        command: commands::settings::SettingsCommands,
    },
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli, settings: AppSettings) -> anyhow::Result<()> {
    let format = cli.output.format();
    let quiet = cli.output.quiet;

    match cli.command {
        Commands::Replay(args) => commands::replay::run(args, &settings, format, quiet).await,
        Commands::Set(args) => commands::set::run(args, &settings, format, quiet).await,
        Commands::Settings { command } => {
            commands::settings::run(command, &settings, format, quiet).await
        }
    }
}
