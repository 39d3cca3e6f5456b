//! Master bus compressor and limiter.

use ry_ir::{CompressorSettings, LimiterSettings};

use super::{db_to_gain, gain_to_db, time_coeff};
use crate::Frame;

/// Soft knee width in dB.
pub const KNEE_DB: f32 = 30.0;

/// Limiter release time in seconds.
const LIMITER_RELEASE: f32 = 0.01;

/// Stereo-linked feed-forward compressor with a soft knee.
#[derive(Clone, Debug)]
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    /// Smoothed gain reduction in dB.
    gr_db: f32,
}

impl Compressor {
    pub fn new(settings: &CompressorSettings, sample_rate: f32) -> Self {
        let mut comp = Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            gr_db: 0.0,
        };
        comp.set_settings(settings);
        comp
    }

    pub fn set_settings(&mut self, settings: &CompressorSettings) {
        self.threshold_db = settings.threshold_db;
        self.ratio = settings.ratio.max(1.0);
        self.attack_coeff = time_coeff(settings.attack, self.sample_rate);
        self.release_coeff = time_coeff(settings.release, self.sample_rate);
    }

    /// Current gain reduction in dB (positive means attenuating).
    pub fn gain_reduction(&self) -> f32 {
        self.gr_db
    }

    pub fn reset(&mut self) {
        self.gr_db = 0.0;
    }

    fn target_reduction(&self, input_db: f32) -> f32 {
        let half_knee = KNEE_DB / 2.0;
        let knee_start = self.threshold_db - half_knee;
        let knee_end = self.threshold_db + half_knee;
        let slope = 1.0 - 1.0 / self.ratio;

        if input_db < knee_start {
            0.0
        } else if input_db > knee_end {
            (input_db - self.threshold_db) * slope
        } else {
            let x = input_db - knee_start;
            slope * x * x / (2.0 * KNEE_DB)
        }
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let target = self.target_reduction(gain_to_db(input.peak()));
        let coeff = if target > self.gr_db { self.attack_coeff } else { self.release_coeff };
        self.gr_db = target + (self.gr_db - target) * coeff;
        input * db_to_gain(-self.gr_db)
    }
}

/// Brickwall peak limiter with instant attack.
#[derive(Clone, Debug)]
pub struct Limiter {
    ceiling: f32,
    release_coeff: f32,
    gain: f32,
}

impl Limiter {
    pub fn new(settings: &LimiterSettings, sample_rate: f32) -> Self {
        Self {
            ceiling: db_to_gain(settings.threshold_db),
            release_coeff: time_coeff(LIMITER_RELEASE, sample_rate),
            gain: 1.0,
        }
    }

    pub fn set_settings(&mut self, settings: &LimiterSettings) {
        self.ceiling = db_to_gain(settings.threshold_db);
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let peak = input.peak();
        let needed = if peak > self.ceiling { self.ceiling / peak } else { 1.0 };
        if needed < self.gain {
            self.gain = needed;
        } else {
            self.gain = needed + (self.gain - needed) * self.release_coeff;
        }
        input * self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn quiet_signal_is_untouched() {
        let mut comp = Compressor::new(&CompressorSettings::default(), SR);
        let out = comp.process(Frame::mono(0.001));
        assert_eq!(out, Frame::mono(0.001));
    }

    #[test]
    fn loud_signal_is_reduced() {
        let mut comp = Compressor::new(&CompressorSettings::default(), SR);
        let mut out = Frame::silence();
        for _ in 0..44_100 {
            out = comp.process(Frame::mono(1.0));
        }
        assert!(comp.gain_reduction() > 10.0);
        assert!(out.left < 0.5);
    }

    #[test]
    fn knee_is_continuous() {
        let comp = Compressor::new(&CompressorSettings::default(), SR);
        let below = comp.target_reduction(-39.0 - 1e-3);
        let above = comp.target_reduction(-9.0 + 1e-3);
        assert!(below.abs() < 1e-3);
        let straight = (-9.0 - comp.threshold_db) * (1.0 - 1.0 / comp.ratio);
        assert!((above - straight).abs() < 1e-2);
    }

    #[test]
    fn limiter_holds_ceiling() {
        let mut lim = Limiter::new(&LimiterSettings::default(), SR);
        let ceiling = db_to_gain(-1.0);
        for i in 0..1000 {
            let x = if i % 2 == 0 { 2.0 } else { -1.5 };
            let out = lim.process(Frame::mono(x));
            assert!(out.peak() <= ceiling + 1e-6);
        }
    }

    #[test]
    fn limiter_recovers() {
        let mut lim = Limiter::new(&LimiterSettings::default(), SR);
        lim.process(Frame::mono(4.0));
        for _ in 0..44_100 {
            lim.process(Frame::mono(0.1));
        }
        assert!((lim.process(Frame::mono(0.1)).left - 0.1).abs() < 1e-4);
    }
}
