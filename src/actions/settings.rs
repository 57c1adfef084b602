//! Setters for every user-configurable field

use tokio::task::JoinHandle;

use super::{Actions, Optimistic, Settlement};
use crate::backend::Command;
use crate::config::{DisplayMode, MiningConfig, MiningMode, NodeType};
use crate::state::MiningState;

impl Actions {
    // Core

    pub fn set_allow_telemetry(&self, allow_telemetry: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.allow_telemetry,
            allow_telemetry,
            Command::SetAllowTelemetry { allow_telemetry },
        )
        .on_reject("Could not change the telemetry setting")
        .spawn(self)
    }

    pub fn set_auto_update(&self, auto_update: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.auto_update,
            auto_update,
            Command::SetAutoUpdate { auto_update },
        )
        .on_reject("Could not change the auto-update setting")
        .spawn(self)
    }

    pub fn set_pre_release(&self, pre_release: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.pre_release,
            pre_release,
            Command::SetPreRelease { pre_release },
        )
        .on_reject("Could not change the pre-release setting")
        .spawn(self)
    }

    pub fn set_should_auto_launch(&self, should_auto_launch: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.should_auto_launch,
            should_auto_launch,
            Command::SetShouldAutoLaunch { should_auto_launch },
        )
        .on_reject("Could not change the auto-launch setting")
        .spawn(self)
    }

    pub fn set_use_tor(&self, use_tor: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.use_tor,
            use_tor,
            Command::SetUseTor { use_tor },
        )
        .on_reject("Could not change the Tor setting")
        .spawn(self)
    }

    pub fn set_p2pool_enabled(&self, p2pool_enabled: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.p2pool_enabled,
            p2pool_enabled,
            Command::SetP2poolEnabled { p2pool_enabled },
        )
        .on_reject("Could not change the P2Pool setting")
        .spawn(self)
    }

    /// Also mirrors the accepted type into the node store
    pub fn set_node_type(&self, node_type: NodeType) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.core_config,
            |c| &mut c.node_type,
            node_type,
            Command::SetNodeType { node_type },
        )
        .on_reject("Could not change the node type")
        .after_accept(move |actions| async move {
            actions.stores.node.update(|n| n.node_type = node_type);
        })
        .spawn(self)
    }

    // Wallet

    pub fn set_monero_address(&self, monero_address: String) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.wallet_config,
            |w| &mut w.monero_address,
            monero_address.clone(),
            Command::SetMoneroAddress { monero_address },
        )
        .on_reject("Could not change the Monero address")
        .after_accept(|actions| async move { actions.restart_mining().await })
        .spawn(self)
    }

    pub fn set_external_tari_address(&self, address: Option<String>) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.wallet_config,
            |w| &mut w.external_tari_address,
            address.clone(),
            Command::SetExternalTariAddress { address },
        )
        .on_reject("Could not change the payout address")
        .after_accept(|actions| async move { actions.restart_mining().await })
        .spawn(self)
    }

    // Mining

    /// Custom usage values only matter in [`MiningMode::Custom`] but are always stored
    pub fn set_mode(
        &self,
        mode: MiningMode,
        custom_cpu_usage: u32,
        custom_gpu_usage: u32,
    ) -> JoinHandle<Settlement> {
        Optimistic::with_swap(
            &self.stores.mining_config,
            |m: &mut MiningConfig, (mode, cpu, gpu): (MiningMode, u32, u32)| {
                let previous = (m.mode, m.custom_max_cpu_usage, m.custom_max_gpu_usage);
                m.mode = mode;
                m.custom_max_cpu_usage = cpu;
                m.custom_max_gpu_usage = gpu;
                previous
            },
            (mode, custom_cpu_usage, custom_gpu_usage),
            Command::SetMode {
                mode,
                custom_cpu_usage,
                custom_gpu_usage,
            },
        )
        .on_reject("Could not change the mining mode")
        .after_accept(|actions| async move {
            if actions.stores.mining.read(MiningState::is_mining) {
                actions.restart_mining().await;
            }
        })
        .spawn(self)
    }

    pub fn set_mine_on_app_start(&self, mine_on_app_start: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.mining_config,
            |m| &mut m.mine_on_app_start,
            mine_on_app_start,
            Command::SetMineOnAppStart { mine_on_app_start },
        )
        .on_reject("Could not change the mine-on-start setting")
        .spawn(self)
    }

    /// Stops the CPU miner first if it is running, then restarts it if the
    /// user still wants to mine
    pub fn set_cpu_mining_enabled(&self, enabled: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.mining_config,
            |m| &mut m.cpu_mining_enabled,
            enabled,
            Command::SetCpuMiningEnabled { enabled },
        )
        .on_reject("Could not change CPU mining")
        .before(|actions| async move {
            if actions.stores.mining.read(|m| m.cpu.is_mining) {
                actions.stop_cpu_mining().await;
            }
        })
        .after_accept(move |actions| async move {
            let initiated = actions.stores.mining.read(|m| m.mining_initiated);
            if enabled && initiated {
                actions.start_cpu_mining().await;
            } else if !enabled {
                actions.stop_cpu_mining().await;
            }
        })
        .spawn(self)
    }

    /// Same as [`Actions::set_cpu_mining_enabled`], and keeps the per-device
    /// exclusions in line with the modality switch
    pub fn set_gpu_mining_enabled(&self, enabled: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.mining_config,
            |m| &mut m.gpu_mining_enabled,
            enabled,
            Command::SetGpuMiningEnabled { enabled },
        )
        .on_reject("Could not change GPU mining")
        .before(|actions| async move {
            if actions.stores.mining.read(|m| m.gpu.is_mining) {
                actions.stop_gpu_mining().await;
            }
        })
        .after_accept(move |actions| async move {
            actions.align_gpu_exclusions(enabled).await;
            let initiated = actions.stores.mining.read(|m| m.mining_initiated);
            if enabled && initiated {
                actions.start_gpu_mining().await;
            } else if !enabled {
                actions.stop_gpu_mining().await;
            }
        })
        .spawn(self)
    }

    pub fn set_excluded_gpu_devices(&self, excluded: Vec<u32>) -> JoinHandle<Settlement> {
        Optimistic::with_swap(
            &self.stores.mining,
            |m: &mut MiningState, excluded: Vec<u32>| {
                let previous = m.excluded_devices();
                for device in &mut m.gpu_devices {
                    device.excluded = excluded.contains(&device.device_index);
                }
                previous
            },
            excluded.clone(),
            Command::SetExcludedGpuDevices {
                excluded_gpu_devices: excluded,
            },
        )
        .on_reject("Could not change GPU device selection")
        .spawn(self)
    }

    /// Enabling clears a blanket exclusion, disabling excludes every device
    async fn align_gpu_exclusions(&self, enabled: bool) {
        let devices = self.stores.mining.read(|m| m.gpu_devices.clone());
        if devices.is_empty() {
            return;
        }

        let excluded = if enabled {
            if !devices.iter().all(|d| d.excluded) {
                return;
            }
            Vec::new()
        } else {
            if devices.iter().all(|d| d.excluded) {
                return;
            }
            devices.iter().map(|d| d.device_index).collect()
        };

        if let Err(e) = self.set_excluded_gpu_devices(excluded).await {
            tracing::error!("GPU exclusion task failed: {}", e);
        }
    }

    // UI

    pub fn set_display_mode(&self, display_mode: DisplayMode) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.ui_config,
            |u| &mut u.display_mode,
            display_mode,
            Command::SetDisplayMode { display_mode },
        )
        .on_reject("Could not change the display mode")
        .spawn(self)
    }

    pub fn set_application_language(&self, application_language: String) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.ui_config,
            |u| &mut u.application_language,
            application_language.clone(),
            Command::SetApplicationLanguage {
                application_language,
            },
        )
        .on_reject("Could not change the language")
        .spawn(self)
    }

    pub fn set_visual_mode(&self, enabled: bool) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.ui_config,
            |u| &mut u.visual_mode,
            enabled,
            Command::SetVisualMode { enabled },
        )
        .on_reject("Could not change visual mode")
        .spawn(self)
    }

    pub fn set_show_experimental_settings(
        &self,
        show_experimental_settings: bool,
    ) -> JoinHandle<Settlement> {
        Optimistic::field(
            &self.stores.ui_config,
            |u| &mut u.show_experimental_settings,
            show_experimental_settings,
            Command::SetShowExperimentalSettings {
                show_experimental_settings,
            },
        )
        .on_reject("Could not change experimental settings")
        .spawn(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::RecordingBackend;
    use crate::config::{CoreConfig, UiConfig, WalletConfig};
    use crate::events::GpuDevice;
    use crate::state::Stores;

    fn setup() -> (Arc<RecordingBackend>, Actions) {
        let backend = Arc::new(RecordingBackend::new());
        let actions = Actions::new(backend.clone(), Stores::default());
        (backend, actions)
    }

    fn devices(excluded: &[bool]) -> Vec<GpuDevice> {
        excluded
            .iter()
            .enumerate()
            .map(|(i, &excluded)| GpuDevice {
                device_index: i as u32,
                device_name: format!("GPU {}", i),
                excluded,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_accepted_changes_stick() {
        let (_backend, actions) = setup();
        let stores = actions.stores().clone();

        actions.set_allow_telemetry(false).await.unwrap();
        actions.set_auto_update(false).await.unwrap();
        actions.set_pre_release(true).await.unwrap();
        actions.set_should_auto_launch(true).await.unwrap();
        actions.set_p2pool_enabled(false).await.unwrap();
        actions.set_mine_on_app_start(true).await.unwrap();
        actions.set_display_mode(DisplayMode::Dark).await.unwrap();
        actions.set_application_language("de".to_string()).await.unwrap();
        actions.set_visual_mode(false).await.unwrap();
        actions.set_show_experimental_settings(true).await.unwrap();

        let core = stores.core_config.get();
        assert!(!core.allow_telemetry);
        assert!(!core.auto_update);
        assert!(core.pre_release);
        assert!(core.should_auto_launch);
        assert!(!core.p2pool_enabled);
        assert!(stores.mining_config.get().mine_on_app_start);
        let ui = stores.ui_config.get();
        assert_eq!(ui.display_mode, DisplayMode::Dark);
        assert_eq!(ui.application_language, "de");
        assert!(!ui.visual_mode);
        assert!(ui.show_experimental_settings);
        assert!(stores.errors.get().raised.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_changes_roll_back() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        for name in [
            "set_allow_telemetry",
            "set_display_mode",
            "set_application_language",
            "set_monero_address",
            "set_mode",
        ] {
            backend.reject(name);
        }
        let before = stores.snapshot();

        let settled = [
            actions.set_allow_telemetry(false).await.unwrap(),
            actions.set_display_mode(DisplayMode::Light).await.unwrap(),
            actions.set_application_language("fr".to_string()).await.unwrap(),
            actions.set_monero_address("4abc".to_string()).await.unwrap(),
            actions.set_mode(MiningMode::Custom, 10, 90).await.unwrap(),
        ];

        assert!(settled.iter().all(|s| *s == Settlement::Rejected));
        let after = stores.snapshot();
        assert_eq!(after.core_config, before.core_config);
        assert_eq!(after.ui_config, before.ui_config);
        assert_eq!(after.wallet_config, before.wallet_config);
        assert_eq!(after.mining_config, before.mining_config);
        assert_eq!(after.errors.raised.len(), 5);
        assert_eq!(after.errors.raised[4].message, "Could not change the mining mode");
    }

    #[tokio::test]
    async fn test_node_type_updates_node_store() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();

        actions.set_node_type(NodeType::Remote).await.unwrap();
        assert_eq!(stores.core_config.get().node_type, NodeType::Remote);
        assert_eq!(stores.node.get().node_type, NodeType::Remote);

        backend.reject("set_node_type");
        actions.set_node_type(NodeType::RemoteUntilLocal).await.unwrap();
        assert_eq!(stores.core_config.get().node_type, NodeType::Remote);
        assert_eq!(stores.node.get().node_type, NodeType::Remote);
    }

    #[tokio::test]
    async fn test_address_change_restarts_initiated_mining() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.setup.update(|s| s.cpu_mining_unlocked = true);
        stores.mining.update(|m| {
            m.mining_initiated = true;
            m.cpu.is_mining = true;
        });

        actions.set_monero_address("4xyz".to_string()).await.unwrap();

        assert_eq!(stores.wallet_config.get().monero_address, "4xyz");
        assert_eq!(
            backend.call_names(),
            vec!["set_monero_address", "stop_cpu_mining", "start_cpu_mining"]
        );
        assert!(stores.mining.get().cpu.is_mining);
    }

    #[tokio::test]
    async fn test_mode_change_without_mining_does_not_restart() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();

        actions.set_mode(MiningMode::Ludicrous, 50, 50).await.unwrap();

        assert_eq!(stores.mining_config.get().mode, MiningMode::Ludicrous);
        assert_eq!(backend.call_names(), vec!["set_mode"]);
    }

    #[tokio::test]
    async fn test_enable_cpu_starts_when_initiated() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| m.mining_initiated = true);

        actions.set_cpu_mining_enabled(true).await.unwrap();

        assert_eq!(
            backend.call_names(),
            vec!["set_cpu_mining_enabled", "start_cpu_mining"]
        );
        assert!(stores.mining.get().cpu.is_mining);
    }

    #[tokio::test]
    async fn test_disable_cpu_stops_regardless_of_intent() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();

        actions.set_cpu_mining_enabled(false).await.unwrap();

        assert!(!stores.mining_config.get().cpu_mining_enabled);
        assert_eq!(
            backend.call_names(),
            vec!["set_cpu_mining_enabled", "stop_cpu_mining"]
        );
    }

    #[tokio::test]
    async fn test_running_cpu_is_stopped_before_sending() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| {
            m.mining_initiated = true;
            m.cpu.is_mining = true;
        });
        backend.reject("set_cpu_mining_enabled");

        let settled = actions.set_cpu_mining_enabled(false).await.unwrap();

        assert_eq!(settled, Settlement::Rejected);
        assert_eq!(
            backend.call_names(),
            vec!["stop_cpu_mining", "set_cpu_mining_enabled"]
        );
        assert!(stores.mining_config.get().cpu_mining_enabled);
        assert!(!stores.mining.get().cpu.is_mining);
        assert_eq!(stores.errors.get().raised.len(), 1);
    }

    #[tokio::test]
    async fn test_enable_gpu_clears_blanket_exclusion() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| m.gpu_devices = devices(&[true, true, true]));
        stores.mining_config.update(|m| m.gpu_mining_enabled = false);

        actions.set_gpu_mining_enabled(true).await.unwrap();

        let mining = stores.mining.get();
        assert!(mining.excluded_devices().is_empty());
        assert!(backend.calls().contains(&Command::SetExcludedGpuDevices {
            excluded_gpu_devices: vec![]
        }));
    }

    #[tokio::test]
    async fn test_disable_gpu_excludes_every_device() {
        let (_backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| m.gpu_devices = devices(&[false, true]));

        actions.set_gpu_mining_enabled(false).await.unwrap();

        assert_eq!(stores.mining.get().excluded_devices(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_enable_gpu_keeps_partial_exclusion() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| m.gpu_devices = devices(&[false, true]));

        actions.set_gpu_mining_enabled(true).await.unwrap();

        assert_eq!(stores.mining.get().excluded_devices(), vec![1]);
        assert!(!backend.call_names().contains(&"set_excluded_gpu_devices"));
    }

    #[tokio::test]
    async fn test_rejected_exclusion_rolls_devices_back() {
        let (backend, actions) = setup();
        let stores = actions.stores().clone();
        stores.mining.update(|m| m.gpu_devices = devices(&[false, false]));
        backend.reject("set_excluded_gpu_devices");

        let settled = actions.set_gpu_mining_enabled(false).await.unwrap();

        assert_eq!(settled, Settlement::Accepted);
        assert!(!stores.mining_config.get().gpu_mining_enabled);
        assert!(stores.mining.get().excluded_devices().is_empty());
        assert_eq!(stores.errors.get().raised.len(), 1);
    }

    const EVERY_SETTER: [&str; 17] = [
        "set_allow_telemetry",
        "set_auto_update",
        "set_pre_release",
        "set_should_auto_launch",
        "set_node_type",
        "set_use_tor",
        "set_p2pool_enabled",
        "set_monero_address",
        "set_external_tari_address",
        "set_mode",
        "set_mine_on_app_start",
        "set_cpu_mining_enabled",
        "set_gpu_mining_enabled",
        "set_excluded_gpu_devices",
        "set_display_mode",
        "set_application_language",
        "set_visual_mode",
    ];

    /// Change the setting behind `command` away from its default
    fn change(actions: &Actions, command: &str) -> JoinHandle<Settlement> {
        match command {
            "set_allow_telemetry" => actions.set_allow_telemetry(false),
            "set_auto_update" => actions.set_auto_update(false),
            "set_pre_release" => actions.set_pre_release(true),
            "set_should_auto_launch" => actions.set_should_auto_launch(true),
            "set_node_type" => actions.set_node_type(NodeType::Remote),
            "set_use_tor" => actions.set_use_tor(false),
            "set_p2pool_enabled" => actions.set_p2pool_enabled(false),
            "set_monero_address" => actions.set_monero_address("4xmr".to_string()),
            "set_external_tari_address" => {
                actions.set_external_tari_address(Some("tari1".to_string()))
            }
            "set_mode" => actions.set_mode(MiningMode::Ludicrous, 80, 90),
            "set_mine_on_app_start" => actions.set_mine_on_app_start(true),
            "set_cpu_mining_enabled" => actions.set_cpu_mining_enabled(false),
            "set_gpu_mining_enabled" => actions.set_gpu_mining_enabled(false),
            "set_excluded_gpu_devices" => actions.set_excluded_gpu_devices(vec![1]),
            "set_display_mode" => actions.set_display_mode(DisplayMode::Dark),
            "set_application_language" => actions.set_application_language("pl".to_string()),
            "set_visual_mode" => actions.set_visual_mode(false),
            other => panic!("no setter for {}", other),
        }
    }

    type SettingsView = (CoreConfig, WalletConfig, MiningConfig, UiConfig, Vec<u32>);

    fn settings_view(stores: &Stores) -> SettingsView {
        (
            stores.core_config.get(),
            stores.wallet_config.get(),
            stores.mining_config.get(),
            stores.ui_config.get(),
            stores.mining.read(MiningState::excluded_devices),
        )
    }

    #[tokio::test]
    async fn test_every_setter_sticks_or_reverts() {
        for command in EVERY_SETTER {
            for reject in [false, true] {
                let (backend, actions) = setup();
                let stores = actions.stores().clone();
                if command == "set_excluded_gpu_devices" {
                    stores.mining.update(|m| m.gpu_devices = devices(&[false, false]));
                }
                if reject {
                    backend.reject(command);
                }
                let before = settings_view(&stores);

                let settled = change(&actions, command).await.unwrap();

                let after = settings_view(&stores);
                let raised = stores.errors.get().raised.len();
                if reject {
                    assert_eq!(settled, Settlement::Rejected, "{}", command);
                    assert_eq!(after, before, "{} did not revert", command);
                    assert_eq!(raised, 1, "{}", command);
                } else {
                    assert_eq!(settled, Settlement::Accepted, "{}", command);
                    assert_ne!(after, before, "{} did not stick", command);
                    assert_eq!(raised, 0, "{}", command);
                }
                assert!(backend.call_names().contains(&command), "{}", command);
            }
        }
    }
}
