//! Named event channels between the backend and the bridge

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::mpsc;

/// Channel carrying backend state-update events
pub const BACKEND_STATE_UPDATE: &str = "backend_state_update";

/// Fan-out of raw messages to subscribers, per channel name
#[derive(Default)]
pub struct EventHub {
    channels: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Value>>>>,
}

/// Receiving end of one subscription; dropping it unsubscribes
pub struct Subscription {
    channel: String,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next message, or None once the channel is closed
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .entry(channel.to_string())
            .or_default()
            .push(tx);
        tracing::debug!("Subscribed to {}", channel);
        Subscription {
            channel: channel.to_string(),
            rx,
        }
    }

    /// Deliver a message to every live subscriber of `channel`.
    /// Returns how many subscribers received it.
    pub fn emit(&self, channel: &str, message: Value) -> usize {
        let mut channels = self.lock();
        let Some(senders) = channels.get_mut(channel) else {
            return 0;
        };
        senders.retain(|tx| tx.send(message.clone()).is_ok());
        senders.len()
    }

    /// Drop every sender of `channel` so subscribers drain and finish
    pub fn close(&self, channel: &str) {
        if self.lock().remove(channel).is_some() {
            tracing::debug!("Closed channel {}", channel);
        }
    }

    /// Number of live subscribers on `channel`
    pub fn subscribers(&self, channel: &str) -> usize {
        let mut channels = self.lock();
        match channels.get_mut(channel) {
            Some(senders) => {
                senders.retain(|tx| !tx.is_closed());
                senders.len()
            }
            None => 0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<mpsc::UnboundedSender<Value>>>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_preserves_order() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe(BACKEND_STATE_UPDATE);

        for i in 0..3 {
            assert_eq!(hub.emit(BACKEND_STATE_UPDATE, json!(i)), 1);
        }
        hub.close(BACKEND_STATE_UPDATE);

        let mut seen = Vec::new();
        while let Some(value) = sub.recv().await {
            seen.push(value);
        }
        assert_eq!(seen, vec![json!(0), json!(1), json!(2)]);
    }

    #[test]
    fn test_dropped_subscription_unsubscribes() {
        let hub = EventHub::new();
        let sub = hub.subscribe("a");
        assert_eq!(sub.channel(), "a");
        assert_eq!(hub.subscribers("a"), 1);

        drop(sub);
        assert_eq!(hub.emit("a", json!(null)), 0);
        assert_eq!(hub.subscribers("a"), 0);
    }

    #[test]
    fn test_channels_are_independent() {
        let hub = EventHub::new();
        let _a = hub.subscribe("a");
        assert_eq!(hub.emit("b", json!(1)), 0);
        assert_eq!(hub.emit("a", json!(1)), 1);
    }
}
