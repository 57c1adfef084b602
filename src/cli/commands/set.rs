//! Optimistic settings changes against the scripted backend

use anyhow::{Context, Result, bail};
use clap::Args;
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::actions::{Actions, Settlement};
use crate::cli::output::{OutputFormat, print_formatted, status_line};
use crate::settings::AppSettings;
use crate::state::Stores;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Changes as `domain.field=value`, e.g. `mining.cpu_mining_enabled=false`
    #[arg(required = true)]
    pub changes: Vec<String>,

    /// Make the backend reject every change
    #[arg(long)]
    pub reject: bool,
}

#[derive(Serialize)]
struct ChangeResult {
    key: String,
    before: Value,
    after: Value,
    accepted: bool,
}

#[derive(Serialize)]
struct SetReport {
    changes: Vec<ChangeResult>,
    errors: Vec<String>,
}

pub async fn run(
    args: SetArgs,
    settings: &AppSettings,
    format: OutputFormat,
    _quiet: bool,
) -> Result<()> {
    let forced = if args.reject {
        args.changes
            .iter()
            .map(|change| split_change(change).and_then(|(key, _)| command_name(key)))
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };
    let backend = super::scripted_backend(&settings.replay, forced);

    let stores = Stores::default();
    let actions = Actions::new(backend, stores.clone());
    let changes = apply_all(&actions, &args.changes).await?;

    // Errors are shown once, then dismissed
    let mut errors = Vec::new();
    stores.errors.update(|e| {
        while let Some(error) = e.dismiss() {
            errors.push(error.message);
        }
    });

    let report = SetReport { changes, errors };

    print_formatted(&report, format, |r| {
        let mut lines: Vec<String> = r
            .changes
            .iter()
            .map(|c| {
                status_line(
                    c.accepted,
                    &format!("{}: {} -> {}", c.key, c.before, c.after),
                )
            })
            .collect();
        lines.extend(r.errors.iter().map(|e| format!("Error: {}", e)));
        lines.join("\n")
    });

    Ok(())
}

/// Start every change at once, then wait for all of them to settle
async fn apply_all(actions: &Actions, changes: &[String]) -> Result<Vec<ChangeResult>> {
    let stores = actions.stores();
    let mut pending = Vec::new();
    for change in changes {
        let (key, value) = split_change(change)?;
        let before = read_field(stores, key)?;
        pending.push((key.to_string(), before, apply(actions, key, value)?));
    }

    let (started, handles): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .map(|(key, before, handle)| ((key, before), handle))
        .unzip();
    let settled = join_all(handles).await;

    let mut results = Vec::new();
    for ((key, before), settlement) in started.into_iter().zip(settled) {
        let accepted = match settlement {
            Ok(settlement) => settlement == Settlement::Accepted,
            Err(e) => {
                tracing::error!("Setting {} failed: {}", key, e);
                false
            }
        };
        results.push(ChangeResult {
            after: read_field(stores, &key)?,
            key,
            before,
            accepted,
        });
    }
    Ok(results)
}

fn split_change(change: &str) -> Result<(&str, &str)> {
    change
        .split_once('=')
        .with_context(|| format!("Expected domain.field=value, got {:?}", change))
}

/// Parse a CLI value as JSON first, falling back to a bare string
fn parse<T: DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(value)
        .or_else(|_| serde_json::from_value(Value::String(value.to_string())))
        .with_context(|| format!("Invalid value: {}", value))
}

fn apply(actions: &Actions, key: &str, value: &str) -> Result<JoinHandle<Settlement>> {
    let handle = match key {
        "core.allow_telemetry" => actions.set_allow_telemetry(parse(value)?),
        "core.auto_update" => actions.set_auto_update(parse(value)?),
        "core.pre_release" => actions.set_pre_release(parse(value)?),
        "core.should_auto_launch" => actions.set_should_auto_launch(parse(value)?),
        "core.node_type" => actions.set_node_type(parse(value)?),
        "core.use_tor" => actions.set_use_tor(parse(value)?),
        "core.p2pool_enabled" => actions.set_p2pool_enabled(parse(value)?),
        "wallet.monero_address" => actions.set_monero_address(value.to_string()),
        "wallet.external_tari_address" => actions.set_external_tari_address(parse(value)?),
        "mining.mode" => {
            let (cpu, gpu) = actions
                .stores()
                .mining_config
                .read(|m| (m.custom_max_cpu_usage, m.custom_max_gpu_usage));
            actions.set_mode(parse(value)?, cpu, gpu)
        }
        "mining.mine_on_app_start" => actions.set_mine_on_app_start(parse(value)?),
        "mining.cpu_mining_enabled" => actions.set_cpu_mining_enabled(parse(value)?),
        "mining.gpu_mining_enabled" => actions.set_gpu_mining_enabled(parse(value)?),
        "ui.display_mode" => actions.set_display_mode(parse(value)?),
        "ui.application_language" => actions.set_application_language(value.to_string()),
        "ui.visual_mode" => actions.set_visual_mode(parse(value)?),
        "ui.show_experimental_settings" => actions.set_show_experimental_settings(parse(value)?),
        _ => bail!("Unknown setting: {}", key),
    };
    Ok(handle)
}

fn command_name(key: &str) -> Result<&'static str> {
    let name = match key {
        "core.allow_telemetry" => "set_allow_telemetry",
        "core.auto_update" => "set_auto_update",
        "core.pre_release" => "set_pre_release",
        "core.should_auto_launch" => "set_should_auto_launch",
        "core.node_type" => "set_node_type",
        "core.use_tor" => "set_use_tor",
        "core.p2pool_enabled" => "set_p2pool_enabled",
        "wallet.monero_address" => "set_monero_address",
        "wallet.external_tari_address" => "set_external_tari_address",
        "mining.mode" => "set_mode",
        "mining.mine_on_app_start" => "set_mine_on_app_start",
        "mining.cpu_mining_enabled" => "set_cpu_mining_enabled",
        "mining.gpu_mining_enabled" => "set_gpu_mining_enabled",
        "ui.display_mode" => "set_display_mode",
        "ui.application_language" => "set_application_language",
        "ui.visual_mode" => "set_visual_mode",
        "ui.show_experimental_settings" => "set_show_experimental_settings",
        _ => bail!("Unknown setting: {}", key),
    };
    Ok(name)
}

/// Current value of `domain.field` from the matching config store
fn read_field(stores: &Stores, key: &str) -> Result<Value> {
    let Some((domain, field)) = key.split_once('.') else {
        bail!("Expected domain.field, got {:?}", key);
    };
    let section = match domain {
        "core" => serde_json::to_value(stores.core_config.get())?,
        "wallet" => serde_json::to_value(stores.wallet_config.get())?,
        "mining" => serde_json::to_value(stores.mining_config.get())?,
        "ui" => serde_json::to_value(stores.ui_config.get())?,
        _ => bail!("Unknown settings domain: {}", domain),
    };
    section
        .get(field)
        .cloned()
        .with_context(|| format!("Unknown setting: {}", key))
}
