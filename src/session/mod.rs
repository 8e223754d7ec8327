pub mod controller;
pub mod pattern;
pub mod state;
pub mod traits;

pub use controller::BreathingController;
pub use pattern::{BreathPattern, PatternPreset};
pub use state::{format_elapsed, Phase, SessionState};
pub use traits::{Presentation, ToneOutput};
