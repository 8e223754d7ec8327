use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::session::{Phase, Presentation};

/// What the draw loop needs to paint a frame: the active phase, when it
/// began (for interpolating the circle), and the two readouts.
#[derive(Debug, Clone)]
pub struct VisualState {
    pub phase: Phase,
    pub duration_secs: u64,
    pub phase_started: Instant,
    pub elapsed: String,
    pub cycles: u32,
}

impl VisualState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            duration_secs: 0,
            phase_started: Instant::now(),
            elapsed: "00:00".to_string(),
            cycles: 0,
        }
    }

    /// Circle scale at this instant: rest is 1.0, a full inhale reaches 1.5,
    /// hold keeps the lungs-full size, exhale shrinks back down.
    pub fn circle_scale(&self) -> f64 {
        let progress = if self.duration_secs == 0 {
            1.0
        } else {
            (self.phase_started.elapsed().as_secs_f64() / self.duration_secs as f64).clamp(0.0, 1.0)
        };

        match self.phase {
            Phase::Idle => 1.0,
            Phase::Hold => 1.5,
            Phase::Inhale => 1.0 + 0.5 * progress,
            Phase::Exhale => 1.5 - 0.5 * progress,
        }
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::new()
    }
}

/// `Presentation` impl for the TUI: session callbacks land in a shared
/// `VisualState` that the draw loop reads each frame.
pub struct TerminalPresenter {
    visual: Arc<Mutex<VisualState>>,
}

impl TerminalPresenter {
    pub fn new(visual: Arc<Mutex<VisualState>>) -> Self {
        Self { visual }
    }
}

impl Presentation for TerminalPresenter {
    fn render(&self, phase: Phase, duration_secs: u64) {
        let Ok(mut visual) = self.visual.lock() else {
            return;
        };
        visual.phase = phase;
        visual.duration_secs = duration_secs;
        visual.phase_started = Instant::now();
    }

    fn reset(&self) {
        let Ok(mut visual) = self.visual.lock() else {
            return;
        };
        visual.phase = Phase::Idle;
        visual.duration_secs = 0;
        visual.phase_started = Instant::now();
    }

    fn render_elapsed(&self, elapsed: &str) {
        let Ok(mut visual) = self.visual.lock() else {
            return;
        };
        visual.elapsed = elapsed.to_string();
    }

    fn render_cycles(&self, cycles: u32) {
        let Ok(mut visual) = self.visual.lock() else {
            return;
        };
        visual.cycles = cycles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn idle_rests_at_scale_one() {
        let visual = VisualState::new();
        assert_eq!(visual.circle_scale(), 1.0);
    }

    #[test]
    fn hold_keeps_the_expanded_scale() {
        let mut visual = VisualState::new();
        visual.phase = Phase::Hold;
        visual.duration_secs = 4;
        assert_eq!(visual.circle_scale(), 1.5);
    }

    #[test]
    fn inhale_grows_toward_full_scale() {
        let mut visual = VisualState::new();
        visual.phase = Phase::Inhale;
        visual.duration_secs = 4;
        visual.phase_started = Instant::now() - Duration::from_secs(2);

        let scale = visual.circle_scale();
        assert!(scale > 1.2 && scale < 1.3, "halfway inhale was {scale}");

        visual.duration_secs = 1;
        assert_eq!(visual.circle_scale(), 1.5); // progress clamps at 1
    }

    #[test]
    fn presenter_callbacks_update_the_shared_state() {
        let visual = Arc::new(Mutex::new(VisualState::new()));
        let presenter = TerminalPresenter::new(Arc::clone(&visual));

        presenter.render(Phase::Inhale, 4);
        presenter.render_elapsed("02:05");
        presenter.render_cycles(3);
        {
            let v = visual.lock().unwrap();
            assert_eq!(v.phase, Phase::Inhale);
            assert_eq!(v.duration_secs, 4);
            assert_eq!(v.elapsed, "02:05");
            assert_eq!(v.cycles, 3);
        }

        presenter.reset();
        let v = visual.lock().unwrap();
        assert_eq!(v.phase, Phase::Idle);
        assert_eq!(v.circle_scale(), 1.0);
    }
}
