use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::info;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{
    pattern::BreathPattern,
    state::{format_elapsed, Phase, SessionState},
    traits::{Presentation, ToneOutput},
};

#[derive(Default)]
struct SessionTasks {
    cancel: Option<CancellationToken>,
    breathing: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

/// Drives one breathing session at a time: owns the phase state machine and
/// pushes every transition to the presentation and tone collaborators.
///
/// Exactly one breathing-loop task and one elapsed-ticker task are live
/// while a session runs. Both re-check the `running` flag on every wakeup,
/// so a task that outlives `stop` by a beat is a guaranteed no-op.
#[derive(Clone)]
pub struct BreathingController {
    state: Arc<Mutex<SessionState>>,
    presenter: Arc<dyn Presentation>,
    tones: Arc<dyn ToneOutput>,
    tasks: Arc<Mutex<SessionTasks>>,
}

impl BreathingController {
    pub fn new(presenter: Arc<dyn Presentation>, tones: Arc<dyn ToneOutput>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            presenter,
            tones,
            tasks: Arc::new(Mutex::new(SessionTasks::default())),
        }
    }

    /// Elapsed-synced copy of the session state.
    pub async fn snapshot(&self) -> SessionState {
        let mut guard = self.state.lock().await;
        guard.sync_elapsed();
        guard.clone()
    }

    /// Begin a session. A no-op returning the current snapshot if one is
    /// already running: no timers are respawned and the cycle count keeps.
    pub async fn start(&self) -> Result<SessionState> {
        {
            let state = self.state.lock().await;
            if state.running {
                info!("breathing session already running; start ignored");
                return Ok(state.clone());
            }
        }

        // Give the tone backend a chance to (re)initialize before the first
        // crossfade. Failure leaves the session visual-only.
        self.tones.ensure_ready();

        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            state.begin(session_id.clone(), Utc::now(), Instant::now());
        }

        self.presenter.render_cycles(0);
        self.presenter.render_elapsed(&format_elapsed(0));

        let cancel = CancellationToken::new();
        let breathing = tokio::spawn(breathing_loop(
            self.state.clone(),
            self.presenter.clone(),
            self.tones.clone(),
            cancel.clone(),
        ));
        let ticker = tokio::spawn(elapsed_loop(
            self.state.clone(),
            self.presenter.clone(),
            cancel.clone(),
        ));

        {
            let mut tasks = self.tasks.lock().await;
            tasks.cancel = Some(cancel);
            tasks.breathing = Some(breathing);
            tasks.ticker = Some(ticker);
        }

        info!("breathing session {session_id} started");
        Ok(self.snapshot().await)
    }

    /// End the running session. A no-op if none is running.
    pub async fn stop(&self) -> Result<SessionState> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.running {
                return Ok(state.clone());
            }
            state.finish();
            state.clone()
        };

        {
            let mut tasks = self.tasks.lock().await;
            if let Some(cancel) = tasks.cancel.take() {
                cancel.cancel();
            }
            if let Some(handle) = tasks.breathing.take() {
                handle.abort();
            }
            if let Some(handle) = tasks.ticker.take() {
                handle.abort();
            }
        }

        if self.tones.is_available() {
            self.tones.crossfade_to(Phase::Idle);
        }
        self.presenter.reset();

        if let Some(id) = &snapshot.session_id {
            info!(
                "breathing session {id} stopped after {} cycles, {}",
                snapshot.cycles,
                format_elapsed(snapshot.elapsed_secs)
            );
        }
        Ok(snapshot)
    }

    /// Overwrite the phase durations. Legal while running; the change takes
    /// effect on the next phase transition, not the phase in progress.
    pub async fn set_pattern(&self, pattern: BreathPattern) -> Result<()> {
        pattern.validate()?;
        let mut state = self.state.lock().await;
        if state.running {
            info!(
                "pattern {} applies from the next phase transition",
                pattern.label()
            );
        }
        state.pattern = pattern;
        Ok(())
    }
}

/// Advances the phase machine, renders, crossfades, then sleeps out the
/// phase duration, until stopped. The first iteration performs the
/// Idle -> Inhale edge immediately.
async fn breathing_loop(
    state: Arc<Mutex<SessionState>>,
    presenter: Arc<dyn Presentation>,
    tones: Arc<dyn ToneOutput>,
    cancel: CancellationToken,
) {
    loop {
        let (phase, duration_secs, new_cycles) = {
            let mut guard = state.lock().await;
            if !guard.running {
                break;
            }
            let cycles_before = guard.cycles;
            let phase = guard.advance();
            let duration_secs = guard.pattern.duration_secs(phase);
            let new_cycles = (guard.cycles != cycles_before).then_some(guard.cycles);
            (phase, duration_secs, new_cycles)
        };

        if let Some(cycles) = new_cycles {
            presenter.render_cycles(cycles);
        }
        presenter.render(phase, duration_secs);
        if tones.is_available() {
            tones.crossfade_to(phase);
        }

        tokio::select! {
            _ = time::sleep(Duration::from_secs(duration_secs)) => {}
            _ = cancel.cancelled() => break,
        }
    }
}

/// Reports `mm:ss` elapsed time once per second, recomputed from the
/// session anchor rather than accumulated.
async fn elapsed_loop(
    state: Arc<Mutex<SessionState>>,
    presenter: Arc<dyn Presentation>,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let elapsed_secs = {
                    let mut guard = state.lock().await;
                    if !guard.running {
                        break;
                    }
                    guard.sync_elapsed();
                    guard.elapsed_secs
                };
                presenter.render_elapsed(&format_elapsed(elapsed_secs));
            }
            _ = cancel.cancelled() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;

    struct NullPresenter;

    impl Presentation for NullPresenter {
        fn render(&self, _phase: Phase, _duration_secs: u64) {}
        fn reset(&self) {}
        fn render_elapsed(&self, _elapsed: &str) {}
        fn render_cycles(&self, _cycles: u32) {}
    }

    struct NullTones;

    impl ToneOutput for NullTones {
        fn ensure_ready(&self) {}
        fn crossfade_to(&self, _phase: Phase) {}
        fn is_available(&self) -> bool {
            false
        }
    }

    fn controller() -> BreathingController {
        BreathingController::new(Arc::new(NullPresenter), Arc::new(NullTones))
    }

    #[tokio::test]
    async fn stop_without_a_session_is_a_no_op() {
        let controller = controller();
        let state = controller.stop().await.unwrap();
        assert!(!state.running);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.session_id.is_none());
    }

    #[tokio::test]
    async fn start_while_running_keeps_the_session() {
        let controller = controller();
        let first = controller.start().await.unwrap();
        let second = controller.start().await.unwrap();
        assert_eq!(first.session_id, second.session_id);
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn set_pattern_rejects_zero_inhale() {
        let controller = controller();
        let err = controller
            .set_pattern(BreathPattern::new(0, 4, 4))
            .await
            .unwrap_err();
        assert_eq!(err.downcast::<PatternError>().unwrap(), PatternError::ZeroInhale);
    }

    #[tokio::test]
    async fn set_pattern_applies_while_idle() {
        let controller = controller();
        controller
            .set_pattern(BreathPattern::new(5, 0, 3))
            .await
            .unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.pattern, BreathPattern::new(5, 0, 3));
    }
}
