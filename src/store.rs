//! Shared view-state containers
//!
//! A [`Store`] is a cloneable handle to one piece of state. Writers replace
//! fields in place and every view holding a receiver is notified.

use std::sync::Arc;

use tokio::sync::watch;

/// Process-wide state container backed by a watch channel
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Store<T> {
    /// Create a store holding the initial value
    pub fn new(initial: T) -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(initial)),
        }
    }

    /// Project a value out of the current state without cloning all of it
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Mutate fields in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Replace the whole state
    pub fn replace(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Receiver that observes every change from now on
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Store<T> {
    /// Snapshot of the current state
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        hits: u32,
        label: String,
    }

    #[test]
    fn test_update_is_partial() {
        let store = Store::new(Counter {
            hits: 1,
            label: "cpu".to_string(),
        });
        store.update(|c| c.hits += 1);
        assert_eq!(store.get().hits, 2);
        assert_eq!(store.read(|c| c.label.clone()), "cpu");
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::<Counter>::default();
        let other = store.clone();
        other.replace(Counter {
            hits: 7,
            label: String::new(),
        });
        assert_eq!(store.get().hits, 7);
    }

    #[tokio::test]
    async fn test_subscriber_sees_change() {
        let store = Store::<Counter>::default();
        let mut rx = store.subscribe();
        store.update(|c| c.label = "gpu".to_string());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().label, "gpu");
    }
}
