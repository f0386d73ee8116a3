use crate::broadcast::types::{DeliveryError, Snapshot};
use tokio::sync::mpsc;

/// Receiver of engine snapshots.
///
/// `deliver` must not block; an error unregisters the observer.
pub trait Observer: Send + Sync {
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), DeliveryError>;
}

impl<F> Observer for F
where
    F: Fn(&Snapshot) -> Result<(), DeliveryError> + Send + Sync,
{
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), DeliveryError> {
        self(snapshot)
    }
}

/// Forwards snapshots into a bounded channel
pub struct ChannelObserver {
    tx: mpsc::Sender<Snapshot>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<Snapshot>) -> Self {
        Self { tx }
    }

    /// Create an observer together with its receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl Observer for ChannelObserver {
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), DeliveryError> {
        self.tx.try_send(snapshot.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backlogged,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}
