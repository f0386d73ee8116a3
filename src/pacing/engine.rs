use crate::broadcast::{ObserverBroadcast, Snapshot};
use crate::config::Configuration;
use crate::metrics::{recorder, MetricsTracker};
use crate::network::{Connector, NetworkResult, PacketTransport};
use crate::pacing::clock::Clock;
use crate::pacing::types::{PacingOptions, RunEnd, TickPlan};
use crate::profile::target_rate;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

/// One run of the pacing loop.
///
/// Holds a frozen copy of the configuration; the run never sees later edits.
pub struct PacingEngine {
    run_id: Uuid,
    config: Configuration,
    options: PacingOptions,
    started_at: Instant,
    clock: Arc<dyn Clock>,
    tracker: Arc<MetricsTracker>,
    broadcast: Arc<ObserverBroadcast>,
    payload: Bytes,
}

impl PacingEngine {
    pub fn new(
        run_id: Uuid,
        config: Configuration,
        options: PacingOptions,
        started_at: Instant,
        clock: Arc<dyn Clock>,
        tracker: Arc<MetricsTracker>,
        broadcast: Arc<ObserverBroadcast>,
    ) -> Self {
        let payload = filler_payload(config.packet_size_bytes);

        Self {
            run_id,
            config,
            options,
            started_at,
            clock,
            tracker,
            broadcast,
            payload,
        }
    }

    /// Drive the run until it is cancelled, expires or the transport fails
    pub async fn run(
        self,
        connector: Arc<dyn Connector>,
        mut cancel: watch::Receiver<bool>,
    ) -> RunEnd {
        let mut transport = match connector.connect(&self.config.target).await {
            Ok(transport) => transport,
            Err(e) => return RunEnd::TransportFailure(e.to_string()),
        };

        let tick = self.options.tick_interval;
        let mut interval = time::interval_at(self.started_at + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let duration = self.config.duration();
        let params = self.config.profile_params();

        loop {
            tokio::select! {
                biased;
                _ = cancel.changed() => return RunEnd::Stopped,
                _ = interval.tick() => {}
            }

            if *cancel.borrow() {
                return RunEnd::Stopped;
            }

            let elapsed = self.clock.now().saturating_duration_since(self.started_at);
            if elapsed > duration {
                return RunEnd::Expired;
            }

            let elapsed_secs = elapsed.as_secs_f64();
            let rate = target_rate(&self.config.profile, &params, elapsed_secs);
            let plan = TickPlan::compute(rate, self.config.packet_size_bytes, &self.options);

            let sent = self
                .send_burst(transport.as_mut(), plan.packets, &cancel)
                .await;
            let (packets, bytes) = match sent {
                Ok(sent) => sent,
                Err(e) => return RunEnd::TransportFailure(e.to_string()),
            };

            if *cancel.borrow() {
                return RunEnd::Stopped;
            }

            recorder::record_tick(plan.rate_mbps, bytes, packets);
            tracing::debug!(
                run_id = %self.run_id,
                elapsed = elapsed_secs,
                rate_mbps = plan.rate_mbps,
                packets,
                "tick"
            );

            let updated = self
                .tracker
                .update(self.run_id, plan.rate_mbps, bytes, packets, elapsed_secs);
            if let Some(metrics) = updated {
                self.broadcast.publish(&Snapshot::Metrics(metrics));
            }
        }
    }

    /// Send `count` packets back to back. Stops early once cancelled.
    async fn send_burst(
        &self,
        transport: &mut dyn PacketTransport,
        count: u64,
        cancel: &watch::Receiver<bool>,
    ) -> NetworkResult<(u64, u64)> {
        let mut packets = 0u64;
        let mut bytes = 0u64;

        for _ in 0..count {
            if *cancel.borrow() {
                break;
            }
            let written = transport.send(&self.payload).await?;
            packets += 1;
            bytes += written as u64;
        }

        Ok((packets, bytes))
    }
}

/// Fixed-length payload with a repeating byte ramp
fn filler_payload(size: usize) -> Bytes {
    (0..size).map(|i| (i % 256) as u8).collect::<Vec<u8>>().into()
}
