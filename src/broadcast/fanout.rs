use crate::broadcast::observer::Observer;
use crate::broadcast::types::{ObserverId, Snapshot};
use crate::metrics::recorder;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Registration set of snapshot observers.
///
/// `publish` copies the set before delivering, so no map lock is held while
/// an observer runs.
#[derive(Default)]
pub struct ObserverBroadcast {
    observers: DashMap<ObserverId, Arc<dyn Observer>>,
    next_id: AtomicU64,
}

impl ObserverBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.insert(id, observer);
        recorder::set_observer_count(self.observers.len());
        tracing::debug!(%id, "observer registered");
        id
    }

    /// Returns false if the observer was already gone
    pub fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.remove(&id).is_some();
        if removed {
            recorder::set_observer_count(self.observers.len());
            tracing::debug!(%id, "observer unregistered");
        }
        removed
    }

    /// Deliver to every registered observer, dropping those that fail.
    ///
    /// Returns the number of successful deliveries.
    pub fn publish(&self, snapshot: &Snapshot) -> usize {
        let targets: Vec<(ObserverId, Arc<dyn Observer>)> = self
            .observers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (id, observer) in targets {
            match observer.deliver(snapshot) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "dropping observer after failed delivery");
                    self.unregister(id);
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::observer::ChannelObserver;
    use crate::broadcast::types::DeliveryError;
    use crate::metrics::Metrics;
    use std::sync::atomic::AtomicUsize;

    fn metrics_snapshot(bytes: u64) -> Snapshot {
        Snapshot::Metrics(Metrics {
            total_bytes_sent: bytes,
            ..Default::default()
        })
    }

    #[test]
    fn test_publish_reaches_all_observers() {
        let broadcast = ObserverBroadcast::new();
        let (a, mut rx_a) = ChannelObserver::channel(8);
        let (b, mut rx_b) = ChannelObserver::channel(8);
        broadcast.register(Arc::new(a));
        broadcast.register(Arc::new(b));

        assert_eq!(broadcast.publish(&metrics_snapshot(42)), 2);
        assert_eq!(rx_a.try_recv().unwrap(), metrics_snapshot(42));
        assert_eq!(rx_b.try_recv().unwrap(), metrics_snapshot(42));
    }

    #[test]
    fn test_failed_observer_is_removed_without_affecting_others() {
        let broadcast = ObserverBroadcast::new();
        let (healthy, mut rx) = ChannelObserver::channel(8);
        let healthy_id = broadcast.register(Arc::new(healthy));

        let failing_calls = Arc::new(AtomicUsize::new(0));
        let calls = failing_calls.clone();
        let failing = move |_: &Snapshot| -> Result<(), DeliveryError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DeliveryError::Disconnected)
        };
        let failing_id = broadcast.register(Arc::new(failing));

        assert_eq!(broadcast.publish(&metrics_snapshot(1)), 1);
        assert!(!broadcast.contains(failing_id));
        assert!(broadcast.contains(healthy_id));

        // No retry on later publishes
        assert_eq!(broadcast.publish(&metrics_snapshot(2)), 1);
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);

        assert_eq!(rx.try_recv().unwrap(), metrics_snapshot(1));
        assert_eq!(rx.try_recv().unwrap(), metrics_snapshot(2));
    }

    #[test]
    fn test_closed_channel_is_removed() {
        let broadcast = ObserverBroadcast::new();
        let (observer, rx) = ChannelObserver::channel(8);
        broadcast.register(Arc::new(observer));
        drop(rx);

        assert_eq!(broadcast.publish(&metrics_snapshot(1)), 0);
        assert!(broadcast.is_empty());
    }

    #[test]
    fn test_unregister() {
        let broadcast = ObserverBroadcast::new();
        let (observer, mut rx) = ChannelObserver::channel(8);
        let id = broadcast.register(Arc::new(observer));

        assert!(broadcast.unregister(id));
        assert!(!broadcast.unregister(id));
        assert_eq!(broadcast.publish(&metrics_snapshot(1)), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_observer_may_unregister_itself_during_publish() {
        let broadcast = Arc::new(ObserverBroadcast::new());
        let slot: Arc<parking_lot::Mutex<Option<ObserverId>>> = Arc::default();

        let (bc, s) = (broadcast.clone(), slot.clone());
        let id = broadcast.register(Arc::new(move |_: &Snapshot| -> Result<(), DeliveryError> {
            if let Some(id) = *s.lock() {
                bc.unregister(id);
            }
            Ok(())
        }));
        *slot.lock() = Some(id);

        assert_eq!(broadcast.publish(&metrics_snapshot(1)), 1);
        assert!(broadcast.is_empty());
    }

    #[test]
    fn test_concurrent_register_and_publish() {
        let broadcast = Arc::new(ObserverBroadcast::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let broadcast = broadcast.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let noop = |_: &Snapshot| -> Result<(), DeliveryError> { Ok(()) };
                        let id = broadcast.register(Arc::new(noop));
                        broadcast.publish(&metrics_snapshot(0));
                        broadcast.unregister(id);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(broadcast.is_empty());
    }
}
