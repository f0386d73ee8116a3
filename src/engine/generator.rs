use crate::broadcast::{EngineSnapshot, Observer, ObserverBroadcast, ObserverId, Snapshot};
use crate::config::Configuration;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::state::{ActiveRun, RunEvent, RunStateMachine};
use crate::engine::types::Status;
use crate::metrics::{recorder, MetricsTracker};
use crate::network::{Connector, UdpConnector};
use crate::pacing::{Clock, PacingEngine, PacingOptions, RunEnd, TokioClock};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

struct Inner {
    config: RwLock<Configuration>,
    state: Mutex<RunStateMachine>,
    running: watch::Sender<bool>,
    tracker: Arc<MetricsTracker>,
    broadcast: Arc<ObserverBroadcast>,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    options: PacingOptions,
}

/// Owns the Idle/Running lifecycle and at most one pacing run.
///
/// Cheap to clone; clones share the same engine. Lock order is
/// state -> config -> tracker, and no lock is held across an await.
#[derive(Clone)]
pub struct TrafficGenerator {
    inner: Arc<Inner>,
}

pub struct TrafficGeneratorBuilder {
    config: Configuration,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    options: PacingOptions,
}

impl Default for TrafficGeneratorBuilder {
    fn default() -> Self {
        Self {
            config: Configuration::default(),
            connector: Arc::new(UdpConnector::default()),
            clock: Arc::new(TokioClock),
            options: PacingOptions::default(),
        }
    }
}

impl TrafficGeneratorBuilder {
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn pacing(mut self, options: PacingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> TrafficGenerator {
        let (running, _) = watch::channel(false);

        TrafficGenerator {
            inner: Arc::new(Inner {
                config: RwLock::new(self.config),
                state: Mutex::new(RunStateMachine::new()),
                running,
                tracker: Arc::new(MetricsTracker::new()),
                broadcast: Arc::new(ObserverBroadcast::new()),
                connector: self.connector,
                clock: self.clock,
                options: self.options,
            }),
        }
    }
}

impl Default for TrafficGenerator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TrafficGenerator {
    pub fn builder() -> TrafficGeneratorBuilder {
        TrafficGeneratorBuilder::default()
    }

    pub fn get_configuration(&self) -> Configuration {
        self.inner.config.read().clone()
    }

    /// Replace the configuration. Rejected while a run is active.
    pub fn set_configuration(&self, config: Configuration) -> EngineResult<()> {
        let state = self.inner.state.lock();
        if state.is_running() {
            return Err(EngineError::ConfigLocked);
        }

        config.validate()?;

        tracing::info!(
            profile = %config.profile,
            target = %config.target,
            duration = config.duration_seconds,
            max_mbps = config.max_bandwidth_mbps,
            "configuration updated"
        );
        *self.inner.config.write() = config;
        Ok(())
    }

    /// Configuration arriving over the push channel.
    ///
    /// Same rules as [`set_configuration`](Self::set_configuration), but a
    /// rejection is only logged. Accepted configurations are broadcast to
    /// every observer.
    pub fn on_config_push(&self, config: Configuration) {
        match self.set_configuration(config.clone()) {
            Ok(()) => {
                self.inner.broadcast.publish(&Snapshot::Config(config));
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring pushed configuration");
            }
        }
    }

    /// Begin a new run with the current configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> EngineResult<Uuid> {
        let clock = &self.inner.clock;
        let run_id = Uuid::new_v4();
        let started_wall = clock.wall_clock();
        let started_at = clock.now();

        let (config, cancel_rx) = {
            let mut state = self.inner.state.lock();
            let (run, cancel_rx) = ActiveRun::new(run_id, started_wall);
            state.transition(RunEvent::Start(run))?;

            let config = self.inner.config.read().clone();
            self.inner.tracker.reset(run_id, started_wall);
            self.inner.running.send_replace(true);
            (config, cancel_rx)
        };

        recorder::record_run_started();
        tracing::info!(
            %run_id,
            profile = %config.profile,
            target = %config.target,
            duration = config.duration_seconds,
            max_mbps = config.max_bandwidth_mbps,
            packet_size = config.packet_size_bytes,
            "traffic generation started"
        );

        let engine = PacingEngine::new(
            run_id,
            config,
            self.inner.options,
            started_at,
            self.inner.clock.clone(),
            self.inner.tracker.clone(),
            self.inner.broadcast.clone(),
        );

        let inner = self.inner.clone();
        let connector = self.inner.connector.clone();
        tokio::spawn(async move {
            let end = engine.run(connector, cancel_rx).await;
            inner.finish_run(run_id, end);
        });

        Ok(run_id)
    }

    /// Cancel the active run. Idempotent and never blocks on the run.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        let run_id = state.active_run();

        if let Ok(true) = state.transition(RunEvent::Stop) {
            if let Some(run_id) = run_id {
                self.inner.tracker.close(run_id);
            }
            self.inner.running.send_replace(false);
            drop(state);

            recorder::record_run_finished(RunEnd::Stopped.label());
            if let Some(run_id) = run_id {
                tracing::info!(%run_id, "traffic generation stopped");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().is_running()
    }

    pub fn status(&self) -> Status {
        let state = self.inner.state.lock();
        Status {
            is_running: state.is_running(),
            metrics: self.inner.tracker.snapshot(),
            run_id: state.active_run(),
            last_run_end: state.last_end().cloned(),
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.inner.state.lock();
        EngineSnapshot {
            config: self.inner.config.read().clone(),
            is_running: state.is_running(),
            metrics: self.inner.tracker.snapshot(),
        }
    }

    /// Register an observer. It first receives the full engine state, then
    /// every live snapshot until it is unregistered or a delivery fails.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> EngineResult<ObserverId> {
        observer.deliver(&Snapshot::State(self.snapshot()))?;
        Ok(self.inner.broadcast.register(observer))
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.inner.broadcast.unregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.broadcast.len()
    }

    /// Resolves once no run is active
    pub async fn wait_idle(&self) {
        let mut running = self.inner.running.subscribe();
        // The sender lives in `inner`, which `self` keeps alive
        let _ = running.wait_for(|running| !*running).await;
    }
}

impl Inner {
    fn finish_run(&self, run_id: Uuid, end: RunEnd) {
        let label = end.label();
        let changed = {
            let mut state = self.state.lock();
            let changed = matches!(
                state.transition(RunEvent::Finished {
                    run_id,
                    end: end.clone(),
                }),
                Ok(true)
            );
            if changed {
                self.tracker.close(run_id);
                self.running.send_replace(false);
            }
            changed
        };

        if !changed {
            return;
        }

        recorder::record_run_finished(label);
        match end {
            RunEnd::TransportFailure(reason) => {
                tracing::error!(%run_id, error = %reason, "run aborted by transport failure");
            }
            RunEnd::Expired => {
                let metrics = self.tracker.snapshot();
                tracing::info!(
                    %run_id,
                    total_bytes = metrics.total_bytes_sent,
                    elapsed = metrics.elapsed_seconds,
                    "run completed"
                );
            }
            RunEnd::Stopped => {}
        }
    }
}
