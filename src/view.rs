//! Onboarding sync screen
//!
//! The screen is a fixed stack of sections; only the video asset depends on
//! the host platform (Safari-based webviews cannot play VP9 with alpha).

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::state::Stores;

const VIDEO_HEVC: &str = "assets/video/sync-hevc.mov";
const VIDEO_VP9: &str = "assets/video/sync-vp9.webm";

const TIPS: &[&str] = &[
    "Mining keeps running while you use other apps.",
    "You can pause mining at any time from the dashboard.",
    "Your wallet keeps syncing in the background.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Macos,
    Windows,
    Linux,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostOs::Macos
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else {
            HostOs::Linux
        }
    }

    pub fn sync_video(self) -> &'static str {
        match self {
            HostOs::Macos => VIDEO_HEVC,
            HostOs::Windows | HostOs::Linux => VIDEO_VP9,
        }
    }
}

/// One block of the sync screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    Heading { title: String },
    SetupProgress { percent: u8, phases_done: usize },
    Video { src: &'static str },
    WalletScanning { scanned: u64, total: u64 },
    Tips { tips: Vec<&'static str> },
}

/// Composed sync screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncView {
    pub sections: Vec<Section>,
}

impl SyncView {
    pub fn compose(stores: &Stores, os: HostOs) -> Self {
        let setup = stores.setup.get();
        let scanning = stores.wallet.read(|w| w.scanning.clone());
        let percent = (setup.overall_progress() * 100.0).round() as u8;

        let title = if setup.app_unlocked {
            "Ready to mine".to_string()
        } else {
            "Setting things up".to_string()
        };

        Self {
            sections: vec![
                Section::Heading { title },
                Section::SetupProgress {
                    percent,
                    phases_done: setup.finished.values().filter(|ok| **ok).count(),
                },
                Section::Video {
                    src: os.sync_video(),
                },
                Section::WalletScanning {
                    scanned: scanning.scanned_height,
                    total: scanning.total_height,
                },
                Section::Tips {
                    tips: TIPS.to_vec(),
                },
            ],
        }
    }
}

impl fmt::Display for SyncView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            match section {
                Section::Heading { title } => writeln!(f, "== {} ==", title)?,
                Section::SetupProgress {
                    percent,
                    phases_done,
                } => writeln!(f, "Setup: {}% ({} phases done)", percent, phases_done)?,
                Section::Video { src } => writeln!(f, "Video: {}", src)?,
                Section::WalletScanning { scanned, total } => {
                    writeln!(f, "Wallet scan: {}/{}", scanned, total)?
                }
                Section::Tips { tips } => {
                    for tip in tips {
                        writeln!(f, "  * {}", tip)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_by_platform() {
        assert_eq!(HostOs::Macos.sync_video(), VIDEO_HEVC);
        assert_eq!(HostOs::Windows.sync_video(), VIDEO_VP9);
        assert_eq!(HostOs::Linux.sync_video(), VIDEO_VP9);
    }

    #[test]
    fn test_composition_is_fixed() {
        let stores = Stores::default();
        let view = SyncView::compose(&stores, HostOs::Linux);
        let kinds: Vec<_> = view
            .sections
            .iter()
            .map(std::mem::discriminant)
            .collect();

        stores.setup.update(|s| s.app_unlocked = true);
        let other = SyncView::compose(&stores, HostOs::Macos);
        let other_kinds: Vec<_> = other
            .sections
            .iter()
            .map(std::mem::discriminant)
            .collect();

        assert_eq!(kinds, other_kinds);
        assert_eq!(view.sections.len(), 5);
        assert!(other.to_string().contains("sync-hevc.mov"));
        assert!(other.to_string().starts_with("== Ready to mine =="));
    }
}
