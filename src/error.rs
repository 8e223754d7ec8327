use thiserror::Error;

/// Failures from the tone playback engine.
///
/// None of these abort a session: the engine flags itself unavailable and
/// the controller carries on visual-only until a later initialization
/// succeeds.
#[derive(Debug, Error)]
pub enum ToneError {
    #[error("no audio output device available: {0}")]
    OutputUnavailable(String),

    #[error("failed to create a tone sink: {0}")]
    SinkUnavailable(String),

    #[error("tone engine thread is not running")]
    EngineStopped,
}

/// Invalid breathing-pattern durations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("inhale duration must be at least one second")]
    ZeroInhale,

    #[error("exhale duration must be at least one second")]
    ZeroExhale,
}
