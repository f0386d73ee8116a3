//! Snapshot fan-out to observers

mod fanout;
mod observer;
mod types;

pub use fanout::ObserverBroadcast;
pub use observer::{ChannelObserver, Observer};
pub use types::{DeliveryError, EngineSnapshot, ObserverId, Snapshot};

/// Default backlog for channel-backed observers
pub const OBSERVER_CHANNEL_CAPACITY: usize = 256;
