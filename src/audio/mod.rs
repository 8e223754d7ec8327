pub mod tone;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use log::{error, info, warn};
use rodio::{OutputStream, Sink};

use crate::error::ToneError;
use crate::session::{Phase, ToneOutput};

use tone::{BreathTone, GainControl};

/// Sine frequencies for the inhale/hold/exhale tones, in Hz.
const TONE_FREQS: [f32; 3] = [396.0, 528.0, 639.0];

/// Seconds a crossfade takes to move a tone between silence and the on level.
pub const FADE_SECS: f32 = 0.2;

enum ToneCommand {
    EnsureReady,
    CrossfadeTo(Phase),
    Shutdown,
}

/// Per-tone gain targets for a crossfade: exactly one tone is audible for
/// the three breathing phases, and idle silences all of them.
pub fn gain_targets(phase: Phase, level: f32) -> [f32; 3] {
    match phase {
        Phase::Inhale => [level, 0.0, 0.0],
        Phase::Hold => [0.0, level, 0.0],
        Phase::Exhale => [0.0, 0.0, level],
        Phase::Idle => [0.0, 0.0, 0.0],
    }
}

/// Handle to the tone engine thread.
///
/// The thread owns the non-Send rodio objects: one output stream and three
/// sinks, each playing an endless `BreathTone`. Commands are fire-and-forget
/// over a channel; initialization failures flip `available` off and are
/// retried by the next `ensure_ready`.
pub struct ToneEngineHandle {
    tx: Arc<Mutex<Option<Sender<ToneCommand>>>>,
    available: Arc<AtomicBool>,
    level: f32,
}

impl ToneEngineHandle {
    pub fn new(level: f32) -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            // Optimistic until a failure is observed: the first crossfade
            // triggers initialization and reports the real outcome.
            available: Arc::new(AtomicBool::new(true)),
            level: level.clamp(0.0, 1.0),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<ToneCommand>, ToneError> {
        let mut guard = self.tx.lock().map_err(|_| ToneError::EngineStopped)?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<ToneCommand>();
        let available = Arc::clone(&self.available);
        let level = self.level;

        // Dedicated thread holding the non-Send audio objects.
        thread::Builder::new()
            .name("tone-engine".to_string())
            .spawn(move || {
                let controls: [Arc<GainControl>; 3] =
                    std::array::from_fn(|_| Arc::new(GainControl::new(0.0)));
                let mut _stream: Option<OutputStream> = None;
                let mut sinks: Option<Vec<Sink>> = None;

                fn ensure_sinks(
                    stream: &mut Option<OutputStream>,
                    sinks: &mut Option<Vec<Sink>>,
                    controls: &[Arc<GainControl>; 3],
                    level: f32,
                ) -> Result<(), ToneError> {
                    if sinks.is_some() {
                        return Ok(());
                    }
                    let (new_stream, handle) = OutputStream::try_default()
                        .map_err(|e| ToneError::OutputUnavailable(e.to_string()))?;
                    let mut created = Vec::with_capacity(TONE_FREQS.len());
                    for (freq, control) in TONE_FREQS.iter().zip(controls.iter()) {
                        let sink = Sink::try_new(&handle)
                            .map_err(|e| ToneError::SinkUnavailable(e.to_string()))?;
                        sink.append(BreathTone::new(*freq, level, Arc::clone(control)));
                        created.push(sink);
                    }
                    *stream = Some(new_stream);
                    *sinks = Some(created);
                    info!("tone engine ready ({} oscillators)", TONE_FREQS.len());
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        ToneCommand::EnsureReady => {
                            match ensure_sinks(&mut _stream, &mut sinks, &controls, level) {
                                Ok(()) => available.store(true, Ordering::SeqCst),
                                Err(err) => {
                                    available.store(false, Ordering::SeqCst);
                                    warn!("tone engine unavailable: {err}");
                                }
                            }
                        }
                        ToneCommand::CrossfadeTo(phase) => {
                            if let Err(err) =
                                ensure_sinks(&mut _stream, &mut sinks, &controls, level)
                            {
                                available.store(false, Ordering::SeqCst);
                                warn!("dropping crossfade to {}: {err}", phase.as_str());
                                continue;
                            }
                            available.store(true, Ordering::SeqCst);
                            for (control, target) in
                                controls.iter().zip(gain_targets(phase, level))
                            {
                                control.set(target);
                            }
                        }
                        ToneCommand::Shutdown => {
                            if let Some(old) = sinks.take() {
                                for sink in old {
                                    sink.stop();
                                }
                            }
                            _stream = None;
                            break;
                        }
                    }
                }
            })
            .map_err(|_| ToneError::EngineStopped)?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: ToneCommand) -> Result<(), ToneError> {
        let tx = self.ensure_thread()?;
        tx.send(cmd).map_err(|_| ToneError::EngineStopped)
    }

    /// Stop playback and let the engine thread exit. Called on app teardown.
    pub fn shutdown(&self) {
        if let Ok(guard) = self.tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(ToneCommand::Shutdown);
            }
        }
    }
}

impl ToneOutput for ToneEngineHandle {
    fn ensure_ready(&self) {
        if let Err(err) = self.send(ToneCommand::EnsureReady) {
            self.available.store(false, Ordering::SeqCst);
            error!("tone engine initialization failed: {err}");
        }
    }

    fn crossfade_to(&self, phase: Phase) {
        if let Err(err) = self.send(ToneCommand::CrossfadeTo(phase)) {
            self.available.store(false, Ordering::SeqCst);
            error!("tone crossfade failed: {err}");
        }
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

/// Tone output used when audio is disabled in settings, and the reference
/// always-failing backend: the session must run identically against it.
pub struct SilentTones;

impl ToneOutput for SilentTones {
    fn ensure_ready(&self) {}

    fn crossfade_to(&self, _phase: Phase) {}

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_tone_audible_per_breathing_phase() {
        for phase in [Phase::Inhale, Phase::Hold, Phase::Exhale] {
            let targets = gain_targets(phase, 0.5);
            let audible = targets.iter().filter(|&&g| g > 0.0).count();
            assert_eq!(audible, 1, "phase {}", phase.as_str());
            assert!(targets.contains(&0.5));
        }
    }

    #[test]
    fn idle_silences_all_tones() {
        assert_eq!(gain_targets(Phase::Idle, 0.5), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn targets_scale_with_the_configured_level() {
        assert_eq!(gain_targets(Phase::Hold, 0.1), [0.0, 0.1, 0.0]);
    }

    #[test]
    fn silent_tones_never_become_available() {
        let tones = SilentTones;
        tones.ensure_ready();
        tones.crossfade_to(Phase::Inhale);
        assert!(!tones.is_available());
    }
}
