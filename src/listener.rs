//! Long-lived subscription to the backend state channel

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::backend::{Backend, Command};
use crate::dispatch::Dispatcher;
use crate::hub::{EventHub, Subscription};

/// Running listener; dropping it without `shutdown` leaves the loop running
pub struct ListenerHandle {
    task: JoinHandle<Dispatcher>,
    ready: JoinHandle<()>,
}

pub struct Listener;

impl Listener {
    /// Subscribe to `channel`, then announce readiness to the backend.
    ///
    /// The ready handshake runs on its own task: its outcome is only logged
    /// and the subscription is already live when it is sent.
    pub fn start(
        hub: &EventHub,
        channel: &str,
        dispatcher: Dispatcher,
        backend: Arc<dyn Backend>,
    ) -> ListenerHandle {
        let subscription = hub.subscribe(channel);
        let task = tokio::spawn(run(subscription, dispatcher));

        let ready = tokio::spawn(async move {
            match backend.invoke(Command::FrontendReady).await {
                Ok(_) => tracing::info!("Frontend ready acknowledged"),
                Err(e) => tracing::error!("Failed to send frontend ready: {}", e),
            }
        });

        ListenerHandle { task, ready }
    }
}

async fn run(mut subscription: Subscription, mut dispatcher: Dispatcher) -> Dispatcher {
    tracing::info!("Listening on {}", subscription.channel());
    while let Some(message) = subscription.recv().await {
        dispatcher.dispatch_raw(message).await;
    }
    tracing::info!("Channel {} closed", subscription.channel());
    dispatcher
}

impl ListenerHandle {
    /// Stop handling events and drop the subscription
    pub fn shutdown(self) {
        self.task.abort();
        self.ready.abort();
        tracing::info!("Listener stopped");
    }

    /// Wait up to `limit` for the channel to close and every received event
    /// to be handled. A pending ready handshake is abandoned, never awaited.
    pub async fn join(self, limit: Duration) -> anyhow::Result<Dispatcher> {
        let Self { mut task, ready } = self;
        match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => {
                if !ready.is_finished() {
                    tracing::warn!("Frontend ready still pending, abandoning it");
                    ready.abort();
                }
                Ok(joined?)
            }
            Err(_) => {
                ListenerHandle { task, ready }.shutdown();
                anyhow::bail!("Listener did not drain within {:?}", limit)
            }
        }
    }
}
