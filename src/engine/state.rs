use crate::engine::error::{EngineError, EngineResult};
use crate::pacing::RunEnd;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

/// Handle on the active run
#[derive(Debug)]
pub struct ActiveRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    cancel: watch::Sender<bool>,
}

impl ActiveRun {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> (Self, watch::Receiver<bool>) {
        let (cancel, cancel_rx) = watch::channel(false);
        (
            Self {
                run_id,
                started_at,
                cancel,
            },
            cancel_rx,
        )
    }

    fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

#[derive(Debug, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running(ActiveRun),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(_))
    }
}

#[derive(Debug)]
pub enum RunEvent {
    Start(ActiveRun),
    Stop,
    Finished { run_id: Uuid, end: RunEnd },
}

/// Idle/Running transitions plus the outcome of the last run
#[derive(Debug, Default)]
pub struct RunStateMachine {
    state: RunState,
    last_end: Option<RunEnd>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn active_run(&self) -> Option<Uuid> {
        match &self.state {
            RunState::Running(run) => Some(run.run_id),
            RunState::Idle => None,
        }
    }

    pub fn last_end(&self) -> Option<&RunEnd> {
        self.last_end.as_ref()
    }

    /// Apply an event; returns whether the state changed.
    ///
    /// `Start` while running is the only rejected transition. `Stop` while
    /// idle and `Finished` for a superseded run are no-ops.
    pub fn transition(&mut self, event: RunEvent) -> EngineResult<bool> {
        match event {
            RunEvent::Start(run) => {
                if self.state.is_running() {
                    return Err(EngineError::AlreadyRunning);
                }
                self.state = RunState::Running(run);
                Ok(true)
            }

            RunEvent::Stop => match std::mem::take(&mut self.state) {
                RunState::Running(run) => {
                    run.cancel();
                    self.last_end = Some(RunEnd::Stopped);
                    Ok(true)
                }
                RunState::Idle => Ok(false),
            },

            RunEvent::Finished { run_id, end } => {
                if self.active_run() != Some(run_id) {
                    return Ok(false);
                }
                self.state = RunState::Idle;
                self.last_end = Some(end);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(sm: &mut RunStateMachine) -> (Uuid, watch::Receiver<bool>) {
        let run_id = Uuid::new_v4();
        let (run, cancel_rx) = ActiveRun::new(run_id, Utc::now());
        sm.transition(RunEvent::Start(run)).unwrap();
        (run_id, cancel_rx)
    }

    #[test]
    fn test_state_machine_creation() {
        let sm = RunStateMachine::new();
        assert!(!sm.is_running());
        assert!(sm.active_run().is_none());
        assert!(sm.last_end().is_none());
    }

    #[test]
    fn test_start_transition() {
        let mut sm = RunStateMachine::new();
        let (run_id, _) = start(&mut sm);
        assert!(sm.is_running());
        assert_eq!(sm.active_run(), Some(run_id));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut sm = RunStateMachine::new();
        let (first, _) = start(&mut sm);

        let (second, _) = ActiveRun::new(Uuid::new_v4(), Utc::now());
        let result = sm.transition(RunEvent::Start(second));
        assert!(matches!(result, Err(EngineError::AlreadyRunning)));
        assert_eq!(sm.active_run(), Some(first));
    }

    #[test]
    fn test_stop_cancels_and_idles() {
        let mut sm = RunStateMachine::new();
        let (_, cancel_rx) = start(&mut sm);

        assert!(sm.transition(RunEvent::Stop).unwrap());
        assert!(!sm.is_running());
        assert!(*cancel_rx.borrow());
        assert_eq!(sm.last_end(), Some(&RunEnd::Stopped));
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let mut sm = RunStateMachine::new();
        assert!(!sm.transition(RunEvent::Stop).unwrap());
        assert!(sm.last_end().is_none());
    }

    #[test]
    fn test_finish_of_active_run() {
        let mut sm = RunStateMachine::new();
        let (run_id, _) = start(&mut sm);

        let changed = sm
            .transition(RunEvent::Finished {
                run_id,
                end: RunEnd::Expired,
            })
            .unwrap();
        assert!(changed);
        assert!(!sm.is_running());
        assert_eq!(sm.last_end(), Some(&RunEnd::Expired));
    }

    #[test]
    fn test_finish_of_superseded_run_is_ignored() {
        let mut sm = RunStateMachine::new();
        let (old, _) = start(&mut sm);
        sm.transition(RunEvent::Stop).unwrap();
        let (current, _) = start(&mut sm);

        let changed = sm
            .transition(RunEvent::Finished {
                run_id: old,
                end: RunEnd::TransportFailure("late".into()),
            })
            .unwrap();
        assert!(!changed);
        assert_eq!(sm.active_run(), Some(current));
        assert_eq!(sm.last_end(), Some(&RunEnd::Stopped));
    }
}
