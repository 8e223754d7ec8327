use super::state::Phase;

/// Rendering side of a session. The controller reports phase changes and
/// bookkeeping; the presentation layer decides how to draw them.
pub trait Presentation: Send + Sync {
    /// Animate from the previous visual state toward `phase`'s target over
    /// `duration_secs`, and update any phase-specific status text.
    fn render(&self, phase: Phase, duration_secs: u64);

    /// Restore rest-state visuals.
    fn reset(&self);

    /// Update the elapsed-time readout with a preformatted `mm:ss` string.
    fn render_elapsed(&self, elapsed: &str);

    /// Update the completed-cycle readout.
    fn render_cycles(&self, cycles: u32);
}

/// Gain-controlled tone playback, one tone per breathing phase.
///
/// Implementations are fire-and-forget: calls never block the caller and
/// never panic. Playback failure is reported through `is_available` so the
/// session can keep going visual-only.
pub trait ToneOutput: Send + Sync {
    /// Best-effort (re)initialization of the playback backend. Safe to call
    /// repeatedly; a later `is_available` reflects the outcome.
    fn ensure_ready(&self);

    /// Ramp `phase`'s tone to the on level and the other tones to silence
    /// over the fade window. `Phase::Idle` silences all three.
    fn crossfade_to(&self, phase: Phase);

    /// Whether the most recent initialization attempt succeeded. Starts
    /// optimistic until a failure is observed.
    fn is_available(&self) -> bool;
}
