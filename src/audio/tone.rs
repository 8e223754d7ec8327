use std::f32::consts::PI;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::Source;

use super::FADE_SECS;

/// Shared gain target for one tone. The engine thread retargets it on every
/// phase change and the source ramps toward it sample by sample.
pub struct GainControl {
    target_bits: AtomicU32,
}

impl GainControl {
    pub fn new(target: f32) -> Self {
        Self {
            target_bits: AtomicU32::new(target.to_bits()),
        }
    }

    pub fn set(&self, target: f32) {
        self.target_bits.store(target.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.target_bits.load(Ordering::Relaxed))
    }
}

/// Sine tone whose gain chases a shared target with a fixed linear slope.
///
/// A full swing between silence and the configured on level takes
/// `FADE_SECS` of the sample clock. Because the slope is applied to the
/// current gain, retargeting mid-ramp continues from wherever the gain is,
/// with no discontinuity.
pub struct BreathTone {
    freq: f32,
    sample_rate: u32,
    num_sample: usize,
    gain: f32,
    step: f32,
    control: Arc<GainControl>,
}

impl BreathTone {
    pub fn new(freq: f32, level: f32, control: Arc<GainControl>) -> Self {
        let sample_rate = 44100;
        let step = (level / (FADE_SECS * sample_rate as f32)).max(1e-6);
        Self {
            freq,
            sample_rate,
            num_sample: 0,
            gain: 0.0,
            step,
            control,
        }
    }

    #[cfg(test)]
    fn gain(&self) -> f32 {
        self.gain
    }
}

impl Iterator for BreathTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.control.get();
        if self.gain < target {
            self.gain = (self.gain + self.step).min(target);
        } else if self.gain > target {
            self.gain = (self.gain - self.step).max(target);
        }

        self.num_sample = self.num_sample.wrapping_add(1);
        let t = self.num_sample as f32 / self.sample_rate as f32;
        Some((2.0 * PI * self.freq * t).sin() * self.gain)
    }
}

impl Source for BreathTone {
    fn current_frame_len(&self) -> Option<usize> {
        None // Infinite stream
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: usize = 44100;

    fn tone_with_target(level: f32, target: f32) -> BreathTone {
        let control = Arc::new(GainControl::new(target));
        BreathTone::new(396.0, level, control)
    }

    #[test]
    fn full_ramp_takes_the_fade_window() {
        let mut tone = tone_with_target(0.5, 0.5);
        let fade_samples = (FADE_SECS * SAMPLE_RATE as f32) as usize;

        // Just before the window closes the ramp is still short of target.
        for _ in 0..fade_samples - 10 {
            tone.next();
        }
        assert!(tone.gain() < 0.5);

        for _ in 0..20 {
            tone.next();
        }
        assert_eq!(tone.gain(), 0.5);
    }

    #[test]
    fn retarget_mid_fade_is_continuous() {
        let control = Arc::new(GainControl::new(0.5));
        let mut tone = BreathTone::new(396.0, 0.5, Arc::clone(&control));

        let half_fade = (FADE_SECS * SAMPLE_RATE as f32 / 2.0) as usize;
        for _ in 0..half_fade {
            tone.next();
        }
        let mid_gain = tone.gain();
        assert!(mid_gain > 0.0 && mid_gain < 0.5);

        // Reverse direction mid-ramp: the gain must step back down from
        // where it is, never jump.
        control.set(0.0);
        let mut prev = tone.gain();
        for _ in 0..100 {
            tone.next();
            let gain = tone.gain();
            assert!(gain <= prev);
            assert!(prev - gain <= 0.5 / (FADE_SECS * SAMPLE_RATE as f32) + f32::EPSILON);
            prev = gain;
        }
    }

    #[test]
    fn samples_stay_within_the_gain_envelope() {
        let mut tone = tone_with_target(0.5, 0.5);
        for _ in 0..SAMPLE_RATE {
            let sample = tone.next().unwrap();
            assert!(sample.abs() <= 0.5 + f32::EPSILON);
        }
    }

    #[test]
    fn silent_target_stays_silent() {
        let mut tone = tone_with_target(0.5, 0.0);
        for _ in 0..1000 {
            assert_eq!(tone.next(), Some(0.0));
        }
    }
}
