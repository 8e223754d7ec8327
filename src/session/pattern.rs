use serde::{Deserialize, Serialize};

use crate::error::PatternError;

use super::state::Phase;

/// Named breathing rhythms selectable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternPreset {
    /// Box breathing: even 4s sides, steadying.
    Box,
    /// 4-7-8 relaxation breathing, for winding down.
    Relax,
    /// Coherent breathing: long even inhale/exhale, no hold.
    Coherent,
}

impl PatternPreset {
    pub const ALL: [PatternPreset; 3] =
        [PatternPreset::Box, PatternPreset::Relax, PatternPreset::Coherent];

    pub fn pattern(&self) -> BreathPattern {
        match self {
            PatternPreset::Box => BreathPattern::new(4, 4, 4),
            PatternPreset::Relax => BreathPattern::new(4, 7, 8),
            PatternPreset::Coherent => BreathPattern::new(5, 0, 5),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatternPreset::Box => "Box 4-4-4",
            PatternPreset::Relax => "Relax 4-7-8",
            PatternPreset::Coherent => "Coherent 5-5",
        }
    }

    /// The preset matching a stored pattern, if any.
    pub fn for_pattern(pattern: &BreathPattern) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.pattern() == *pattern)
    }
}

impl Default for PatternPreset {
    fn default() -> Self {
        PatternPreset::Box
    }
}

/// Per-phase durations for one breathing cycle, in whole seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreathPattern {
    pub inhale_secs: u64,
    pub hold_secs: u64,
    pub exhale_secs: u64,
}

impl Default for BreathPattern {
    fn default() -> Self {
        PatternPreset::Box.pattern()
    }
}

impl BreathPattern {
    pub fn new(inhale_secs: u64, hold_secs: u64, exhale_secs: u64) -> Self {
        Self {
            inhale_secs,
            hold_secs,
            exhale_secs,
        }
    }

    /// A zero hold is legal and skips the hold phase entirely; inhale and
    /// exhale must each last at least one second.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.inhale_secs == 0 {
            return Err(PatternError::ZeroInhale);
        }
        if self.exhale_secs == 0 {
            return Err(PatternError::ZeroExhale);
        }
        Ok(())
    }

    pub fn duration_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Idle => 0,
            Phase::Inhale => self.inhale_secs,
            Phase::Hold => self.hold_secs,
            Phase::Exhale => self.exhale_secs,
        }
    }

    pub fn cycle_secs(&self) -> u64 {
        self.inhale_secs + self.hold_secs + self.exhale_secs
    }

    pub fn label(&self) -> String {
        format!(
            "{}-{}-{}",
            self.inhale_secs, self.hold_secs, self.exhale_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_to_their_patterns() {
        assert_eq!(PatternPreset::Box.pattern(), BreathPattern::new(4, 4, 4));
        assert_eq!(PatternPreset::Relax.pattern(), BreathPattern::new(4, 7, 8));
        assert_eq!(
            PatternPreset::Coherent.pattern(),
            BreathPattern::new(5, 0, 5)
        );
    }

    #[test]
    fn preset_lookup_roundtrips() {
        for preset in PatternPreset::ALL {
            assert_eq!(PatternPreset::for_pattern(&preset.pattern()), Some(preset));
        }
        assert_eq!(PatternPreset::for_pattern(&BreathPattern::new(9, 9, 9)), None);
    }

    #[test]
    fn validation_rejects_zero_inhale_and_exhale_only() {
        assert_eq!(
            BreathPattern::new(0, 4, 4).validate(),
            Err(PatternError::ZeroInhale)
        );
        assert_eq!(
            BreathPattern::new(4, 4, 0).validate(),
            Err(PatternError::ZeroExhale)
        );
        assert!(BreathPattern::new(5, 0, 3).validate().is_ok());
    }

    #[test]
    fn phase_durations_come_from_the_pattern() {
        let pattern = BreathPattern::new(5, 0, 3);
        assert_eq!(pattern.duration_secs(Phase::Inhale), 5);
        assert_eq!(pattern.duration_secs(Phase::Hold), 0);
        assert_eq!(pattern.duration_secs(Phase::Exhale), 3);
        assert_eq!(pattern.duration_secs(Phase::Idle), 0);
        assert_eq!(pattern.cycle_secs(), 8);
    }
}
