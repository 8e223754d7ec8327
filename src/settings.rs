use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::session::BreathPattern;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneSettings {
    pub enabled: bool,
    /// On-level a tone is faded to while its phase is active, 0.0..=1.0.
    pub level: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserSettings {
    pattern: BreathPattern,
    tone: ToneSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            pattern: BreathPattern::default(),
            tone: ToneSettings::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn pattern(&self) -> BreathPattern {
        self.data.read().unwrap().pattern
    }

    pub fn tone(&self) -> ToneSettings {
        self.data.read().unwrap().tone.clone()
    }

    pub fn update_pattern(&self, pattern: BreathPattern) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.pattern = pattern;
        self.persist(&guard)
    }

    pub fn update_tone(&self, tone: ToneSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.tone = tone;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
