//! Application-level runtime state: dialogs and fatal conditions

use serde::Serialize;

use crate::events::{CriticalProblem, ReleaseNotes};

/// Installation-location diagnostic, shown instead of the generic problem dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalError {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub critical_problem: Option<CriticalProblem>,
    pub critical_error: Option<CriticalError>,
    pub missing_applications: Vec<String>,
    pub release_notes: Option<ReleaseNotes>,
    pub show_restart_dialog: bool,
    pub show_exchange_miner_modal: bool,
    pub show_stage_security_modal: bool,
    pub tapplets_csp: Option<String>,
}
