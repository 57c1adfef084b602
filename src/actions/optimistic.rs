//! Optimistic update with rollback
//!
//! The new value is written to the store before the backend hears about it.
//! The backend round-trip runs in a detached task that owns the previous
//! value; on rejection it writes that value back and raises one user error.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use super::Actions;
use crate::backend::Command;
use crate::store::Store;

/// How a settings change ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Accepted,
    Rejected,
}

/// Field accessor used by [`Optimistic::field`]
pub type Lens<T, V> = fn(&mut T) -> &mut V;

type Swap<T, V> = Box<dyn Fn(&mut T, V) -> V + Send + Sync>;
type Step = Box<dyn FnOnce(Actions) -> BoxFuture<'static, ()> + Send>;

const DEFAULT_FAILURE: &str = "Failed to update settings";

/// One pending settings change
pub struct Optimistic<T, V> {
    store: Store<T>,
    swap: Swap<T, V>,
    value: V,
    command: Command,
    failure_message: &'static str,
    before: Option<Step>,
    after_accept: Option<Step>,
}

impl<T, V> Optimistic<T, V>
where
    T: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Change a single field reached through `lens`
    pub fn field(store: &Store<T>, lens: Lens<T, V>, value: V, command: Command) -> Self {
        Self::with_swap(
            store,
            move |state: &mut T, value: V| std::mem::replace(lens(state), value),
            value,
            command,
        )
    }

    /// Change state through `swap`, which writes the new value and returns the old one
    pub fn with_swap<S>(store: &Store<T>, swap: S, value: V, command: Command) -> Self
    where
        S: Fn(&mut T, V) -> V + Send + Sync + 'static,
    {
        Self {
            store: store.clone(),
            swap: Box::new(swap),
            value,
            command,
            failure_message: DEFAULT_FAILURE,
            before: None,
            after_accept: None,
        }
    }

    /// Message shown to the user if the backend rejects the change
    pub fn on_reject(mut self, message: &'static str) -> Self {
        self.failure_message = message;
        self
    }

    /// Run `step` after the local write and before the command is sent
    pub fn before<F, Fut>(mut self, step: F) -> Self
    where
        F: FnOnce(Actions) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.before = Some(Box::new(move |actions| step(actions).boxed()));
        self
    }

    /// Run `step` once the backend has accepted the change
    pub fn after_accept<F, Fut>(mut self, step: F) -> Self
    where
        F: FnOnce(Actions) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.after_accept = Some(Box::new(move |actions| step(actions).boxed()));
        self
    }

    /// Write the new value now and settle with the backend in the background
    pub fn spawn(self, actions: &Actions) -> JoinHandle<Settlement> {
        let Self {
            store,
            swap,
            value,
            command,
            failure_message,
            before,
            after_accept,
        } = self;

        let mut previous = None;
        store.update(|state| previous = Some(swap(state, value)));

        let actions = actions.clone();
        tokio::spawn(async move {
            if let Some(step) = before {
                step(actions.clone()).await;
            }

            let name = command.name();
            match actions.backend.invoke(command).await {
                Ok(_) => {
                    tracing::debug!("Backend accepted {}", name);
                    if let Some(step) = after_accept {
                        step(actions).await;
                    }
                    Settlement::Accepted
                }
                Err(e) => {
                    tracing::warn!("Reverting {}: {}", name, e);
                    if let Some(previous) = previous {
                        store.update(|state| {
                            swap(state, previous);
                        });
                    }
                    actions.stores.raise_error(failure_message);
                    Settlement::Rejected
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::backend::RecordingBackend;
    use crate::config::CoreConfig;
    use crate::state::Stores;

    fn setup() -> (Arc<RecordingBackend>, Actions) {
        let backend = Arc::new(RecordingBackend::new());
        let actions = Actions::new(backend.clone(), Stores::default());
        (backend, actions)
    }

    fn tor_change(actions: &Actions, use_tor: bool) -> Optimistic<CoreConfig, bool> {
        Optimistic::field(
            &actions.stores.core_config,
            |c| &mut c.use_tor,
            use_tor,
            Command::SetUseTor { use_tor },
        )
    }

    #[tokio::test]
    async fn test_write_is_visible_before_settlement() {
        let (backend, actions) = setup();
        backend.delay_next("set_use_tor", [std::time::Duration::from_millis(50)]);

        let handle = tor_change(&actions, false).spawn(&actions);
        assert!(!actions.stores.core_config.get().use_tor);

        assert_eq!(handle.await.unwrap(), Settlement::Accepted);
        assert!(!actions.stores.core_config.get().use_tor);
        assert!(actions.stores.errors.get().raised.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_reverts_and_raises_once() {
        let (backend, actions) = setup();
        backend.reject("set_use_tor");

        let settled = tor_change(&actions, false)
            .on_reject("Could not change Tor setting")
            .spawn(&actions)
            .await
            .unwrap();

        assert_eq!(settled, Settlement::Rejected);
        assert!(actions.stores.core_config.get().use_tor);
        let errors = actions.stores.errors.get().raised;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Could not change Tor setting");
    }

    #[tokio::test]
    async fn test_steps_run_around_the_command() {
        let (backend, actions) = setup();
        let counter = Arc::new(AtomicU32::new(0));
        let before = counter.clone();
        let after = counter.clone();

        tor_change(&actions, true)
            .before(move |_| async move {
                before.fetch_add(1, Ordering::SeqCst);
            })
            .after_accept(move |_| async move {
                after.fetch_add(10, Ordering::SeqCst);
            })
            .spawn(&actions)
            .await
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 11);

        backend.reject("set_use_tor");
        let skipped = counter.clone();
        tor_change(&actions, false)
            .after_accept(move |_| async move {
                skipped.fetch_add(100, Ordering::SeqCst);
            })
            .spawn(&actions)
            .await
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn test_same_value_still_round_trips() {
        let (backend, actions) = setup();
        let before = actions.stores.core_config.get();

        tor_change(&actions, before.use_tor)
            .spawn(&actions)
            .await
            .unwrap();

        assert_eq!(actions.stores.core_config.get(), before);
        assert_eq!(backend.call_names(), vec!["set_use_tor"]);
    }
}
