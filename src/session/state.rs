use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::pattern::BreathPattern;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Inhale,
    Hold,
    Exhale,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Inhale => "inhale",
            Phase::Hold => "hold",
            Phase::Exhale => "exhale",
        }
    }

    /// Status line shown while this phase is active.
    pub fn instruction(&self) -> &'static str {
        match self {
            Phase::Idle => "Press space when you are ready",
            Phase::Inhale => "Breathe in...",
            Phase::Hold => "Hold...",
            Phase::Exhale => "Breathe out...",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub running: bool,
    pub cycles: u32,
    pub elapsed_secs: u64,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub pattern: BreathPattern,
    /// Monotonic session start; elapsed time is recomputed from it rather
    /// than accumulated, so per-tick jitter never drifts the readout.
    #[serde(skip)]
    anchor: Option<Instant>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            running: false,
            cycles: 0,
            elapsed_secs: 0,
            session_id: None,
            started_at: None,
            pattern: BreathPattern::default(),
            anchor: None,
        }
    }
}

impl SessionState {
    pub fn new(pattern: BreathPattern) -> Self {
        Self {
            pattern,
            ..Self::default()
        }
    }

    pub fn begin(&mut self, session_id: String, started_at: DateTime<Utc>, now: Instant) {
        self.phase = Phase::Idle;
        self.running = true;
        self.cycles = 0;
        self.elapsed_secs = 0;
        self.session_id = Some(session_id);
        self.started_at = Some(started_at);
        self.anchor = Some(now);
    }

    pub fn finish(&mut self) {
        self.sync_elapsed();
        self.running = false;
        self.phase = Phase::Idle;
        self.anchor = None;
    }

    pub fn sync_elapsed(&mut self) {
        if let Some(anchor) = self.anchor {
            self.elapsed_secs = anchor.elapsed().as_secs();
        }
    }

    /// Step to the next phase per the breathing cycle and return it.
    ///
    /// The cycle counter bumps on the Exhale -> Inhale edge only, and a
    /// zero hold duration routes Inhale straight to Exhale.
    pub fn advance(&mut self) -> Phase {
        let next = match self.phase {
            Phase::Idle => Phase::Inhale,
            Phase::Exhale => {
                self.cycles += 1;
                Phase::Inhale
            }
            Phase::Inhale if self.pattern.hold_secs > 0 => Phase::Hold,
            Phase::Inhale => Phase::Exhale,
            Phase::Hold => Phase::Exhale,
        };
        self.phase = next;
        next
    }
}

/// Formats whole seconds as an `mm:ss` readout.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
