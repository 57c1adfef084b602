//! CLI command implementations

pub mod replay;
pub mod set;
pub mod settings;

use std::sync::Arc;
use std::time::Duration;

use crate::backend::RecordingBackend;
use crate::settings::ReplaySettings;

/// Backend scripted from the replay settings plus extra rejected command names
fn scripted_backend<'a>(
    settings: &ReplaySettings,
    extra_rejects: impl IntoIterator<Item = &'a str>,
) -> Arc<RecordingBackend> {
    let backend = Arc::new(RecordingBackend::new());
    for name in &settings.rejected_commands {
        backend.reject(name);
    }
    for name in extra_rejects {
        backend.reject(name);
    }
    for (name, value) in &settings.responses {
        backend.respond_with(name, value.clone());
    }
    for (name, delays) in &settings.command_delays_ms {
        backend.delay_next(name, delays.iter().map(|ms| Duration::from_millis(*ms)));
    }
    backend
}
