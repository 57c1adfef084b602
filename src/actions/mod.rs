//! User-triggered actions
//!
//! Settings changes are applied to the local stores first and then sent to
//! the backend (see [`optimistic`]). Mining start/stop actions live in
//! [`mining`].

mod mining;
mod optimistic;
mod settings;

use std::sync::Arc;

use crate::backend::Backend;
use crate::state::Stores;

pub use optimistic::{Optimistic, Settlement};

/// Handle bundling the backend channel with the stores actions mutate
#[derive(Clone)]
pub struct Actions {
    backend: Arc<dyn Backend>,
    stores: Stores,
}

impl Actions {
    pub fn new(backend: Arc<dyn Backend>, stores: Stores) -> Self {
        Self { backend, stores }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}
