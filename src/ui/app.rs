use std::sync::{Arc, Mutex};

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::session::{BreathingController, PatternPreset};
use crate::settings::SettingsStore;

use super::presenter::VisualState;

pub const PARTICLE_COUNT: usize = 50;

/// Background particles drift in a 0..100 coordinate space and wrap at the
/// edges, like the source page's floating dots.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    dx: f64,
    dy: f64,
}

impl Particle {
    fn spawn(rng: &mut StdRng) -> Self {
        let speed = rng.gen_range(1.0..3.0);
        let direction = rng.gen_range(0.0..std::f64::consts::TAU);
        Self {
            x: rng.gen_range(0.0..100.0),
            y: rng.gen_range(0.0..100.0),
            size: rng.gen_range(2.0..7.0),
            dx: direction.cos() * speed * 0.05,
            dy: direction.sin() * speed * 0.05,
        }
    }

    fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        if self.x < 0.0 {
            self.x = 100.0;
        }
        if self.x > 100.0 {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = 100.0;
        }
        if self.y > 100.0 {
            self.y = 0.0;
        }
    }
}

/// Application state for the TUI: the session controller plus everything
/// that is purely decorative.
pub struct App {
    pub controller: BreathingController,
    pub visual: Arc<Mutex<VisualState>>,
    pub settings: Arc<SettingsStore>,
    pub preset: Option<PatternPreset>,
    pub particles: Vec<Particle>,
    pub show_help: bool,
    pub should_quit: bool,
    runtime: tokio::runtime::Handle,
}

impl App {
    pub fn new(
        controller: BreathingController,
        visual: Arc<Mutex<VisualState>>,
        settings: Arc<SettingsStore>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        let particles = (0..PARTICLE_COUNT).map(|_| Particle::spawn(&mut rng)).collect();
        let preset = PatternPreset::for_pattern(&settings.pattern());

        Self {
            controller,
            visual,
            settings,
            preset,
            particles,
            show_help: false,
            should_quit: false,
            runtime,
        }
    }

    pub fn on_tick(&mut self) {
        for particle in &mut self.particles {
            particle.step();
        }
    }

    pub fn visual(&self) -> VisualState {
        self.visual
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|_| VisualState::new())
    }

    pub fn is_running(&self) -> bool {
        self.runtime.block_on(self.controller.snapshot()).running
    }

    pub fn toggle_session(&mut self) {
        let result = if self.is_running() {
            self.runtime.block_on(self.controller.stop())
        } else {
            self.runtime.block_on(self.controller.start())
        };
        if let Err(err) = result {
            warn!("session toggle failed: {err:#}");
        }
    }

    pub fn stop_session(&mut self) {
        if let Err(err) = self.runtime.block_on(self.controller.stop()) {
            warn!("session stop failed: {err:#}");
        }
    }

    /// Switch pattern preset and remember it. Mid-session the new durations
    /// apply from the next phase transition.
    pub fn select_preset(&mut self, preset: PatternPreset) {
        if let Err(err) = self
            .runtime
            .block_on(self.controller.set_pattern(preset.pattern()))
        {
            warn!("pattern change rejected: {err:#}");
            return;
        }
        self.preset = Some(preset);
        if let Err(err) = self.settings.update_pattern(preset.pattern()) {
            warn!("failed to persist pattern: {err:#}");
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.stop_session();
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_wrap_at_the_edges() {
        let mut particle = Particle {
            x: 99.95,
            y: 0.02,
            size: 3.0,
            dx: 0.1,
            dy: -0.1,
        };
        particle.step();
        assert_eq!(particle.x, 0.0);
        assert_eq!(particle.y, 100.0);
    }

    #[test]
    fn spawned_particles_land_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let particle = Particle::spawn(&mut rng);
            assert!((0.0..=100.0).contains(&particle.x));
            assert!((0.0..=100.0).contains(&particle.y));
            assert!((2.0..7.0).contains(&particle.size));
        }
    }
}
