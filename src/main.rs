mod actions;
mod backend;
mod cli;
mod config;
mod dispatch;
mod events;
mod hub;
mod listener;
mod settings;
mod state;
mod store;
mod view;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::AppSettings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Settings are read before logging exists, so report failures afterwards
    let (settings, load_error) = match AppSettings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (AppSettings::default(), Some(e)),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| settings.logging.filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = load_error {
        tracing::warn!("Failed to load settings, using defaults: {}", e);
    }

    cli::run(cli, settings).await
}
