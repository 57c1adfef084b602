//! Replay recorded backend events

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::actions::Actions;
use crate::backend::Command;
use crate::cli::output::{OutputFormat, print_formatted, status_line};
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::hub::EventHub;
use crate::listener::Listener;
use crate::settings::AppSettings;
use crate::state::{Stores, StoresSnapshot};
use crate::view::{HostOs, SyncView};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// File with backend events, as a JSON array or one JSON object per line
    pub file: PathBuf,

    /// Command name the backend should reject (repeatable)
    #[arg(long = "reject")]
    pub reject: Vec<String>,

    /// Platform to render the sync view for
    #[arg(long, value_enum)]
    pub os: Option<HostOs>,

    /// Log setup progress every time it changes
    #[arg(long)]
    pub follow: bool,
}

#[derive(Serialize)]
struct ReplayReport {
    events: usize,
    stats: DispatchStats,
    commands: Vec<Command>,
    state: StoresSnapshot,
    view: SyncView,
}

pub async fn run(
    args: ReplayArgs,
    settings: &AppSettings,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let events = read_events(&args.file)?;
    tracing::info!("Replaying {} events from {:?}", events.len(), args.file);

    let rejects = args.reject.iter().map(String::as_str);
    let backend = super::scripted_backend(&settings.replay, rejects);

    let stores = Stores::default();
    let progress = args.follow.then(|| tokio::spawn(follow_setup(stores.clone())));
    let hub = EventHub::new();
    let channel = settings.replay.channel.as_str();
    let dispatcher = Dispatcher::new(Actions::new(backend.clone(), stores.clone()));
    let listener = Listener::start(&hub, channel, dispatcher, backend.clone());
    if hub.subscribers(channel) == 0 {
        listener.shutdown();
        bail!("Listener failed to subscribe to {}", channel);
    }

    let delay = Duration::from_millis(settings.replay.event_delay_ms);
    let count = events.len();
    for event in events {
        if hub.emit(channel, event) == 0 {
            tracing::warn!("No listener on {}", channel);
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    hub.close(channel);

    // Slow backend responses can hold the loop up; give up after the timeout
    let drained = listener
        .join(Duration::from_secs(settings.replay.timeout_secs))
        .await;
    if let Some(progress) = progress {
        progress.abort();
    }
    let dispatcher = drained?;

    let os = args.os.unwrap_or_else(|| settings.view.host_os());
    let report = ReplayReport {
        events: count,
        stats: dispatcher.stats(),
        commands: backend.calls(),
        state: stores.snapshot(),
        view: SyncView::compose(&stores, os),
    };

    print_formatted(&report, format, |r| {
        let mut out = String::new();
        if !quiet {
            out.push_str(&format!(
                "Replayed {} events: {} handled, {} unrecognized, {} logged\n",
                r.events, r.stats.handled, r.stats.unrecognized, r.stats.logged
            ));
            out.push_str("Commands sent:\n");
            for command in &r.commands {
                let rejected = backend_rejects(settings, &args.reject, command);
                out.push_str(&format!("  {}\n", status_line(!rejected, command.name())));
            }
            out.push_str(&format!(
                "Block height: {}  Peers: {}  Mining: {}\n",
                r.state.node.block_height,
                r.state.node.connected_peers.len(),
                r.state.mining.is_mining()
            ));
            for error in &r.state.errors.raised {
                out.push_str(&format!("Error: {}\n", error.message));
            }
            out.push('\n');
        }
        out.push_str(&r.view.to_string());
        out
    });

    Ok(())
}

async fn follow_setup(stores: Stores) {
    let mut rx = stores.setup.subscribe();
    while rx.changed().await.is_ok() {
        let percent = (rx.borrow_and_update().overall_progress() * 100.0).round();
        tracing::info!("Setup progress: {}%", percent);
    }
}

fn backend_rejects(settings: &AppSettings, extra: &[String], command: &Command) -> bool {
    let name = command.name();
    settings
        .replay
        .rejected_commands
        .iter()
        .chain(extra)
        .any(|rejected| rejected == name)
}

/// Read events from a JSON array or a JSON-lines file
fn read_events(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_events(&content)
}

fn parse_events(content: &str) -> Result<Vec<Value>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Invalid JSON event array");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_lines() {
        let content = "{\"event_type\": \"UnlockApp\"}\n\n{\"event_type\": \"UnlockWallet\"}\n";
        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], json!({"event_type": "UnlockWallet"}));
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#" [{"event_type": "NewBlockHeight", "payload": {"height": 3}}]"#;
        let events = parse_events(content).unwrap();
        assert_eq!(events[0]["payload"]["height"], 3);
    }

    #[test]
    fn test_bad_line_is_reported() {
        let err = parse_events("{\"event_type\": \"UnlockApp\"}\n{oops\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
