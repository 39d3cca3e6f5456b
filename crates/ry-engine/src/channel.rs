//! Mixing channel strip: volume, pan, mute and a level meter.

use std::f32::consts::FRAC_PI_4;

use crate::dsp::fader_gain;
use crate::dsp::meter::Meter;
use crate::frame::Frame;

/// Parameters applied to one channel strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackParams {
    pub volume_db: f32,
    /// -1 (left) to 1 (right).
    pub pan: f32,
    /// Mute after solo resolution.
    pub mute_effective: bool,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self { volume_db: 0.0, pan: 0.0, mute_effective: false }
    }
}

#[derive(Clone, Debug)]
pub struct ChannelStrip {
    params: TrackParams,
    gain_left: f32,
    gain_right: f32,
    pub meter: Meter,
}

impl ChannelStrip {
    pub fn new(sample_rate: f32) -> Self {
        let mut strip = Self {
            params: TrackParams::default(),
            gain_left: 0.0,
            gain_right: 0.0,
            meter: Meter::new(sample_rate),
        };
        strip.set_params(TrackParams::default());
        strip
    }

    pub fn params(&self) -> TrackParams {
        self.params
    }

    pub fn is_muted(&self) -> bool {
        self.params.mute_effective
    }

    pub fn set_params(&mut self, params: TrackParams) {
        self.params = params;
        let gain = if params.mute_effective { 0.0 } else { fader_gain(params.volume_db) };
        // Equal-power pan law.
        let angle = (params.pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        self.gain_left = gain * angle.cos() * std::f32::consts::SQRT_2;
        self.gain_right = gain * angle.sin() * std::f32::consts::SQRT_2;
    }

    /// Pan a mono voice into a stereo frame and meter it.
    #[inline]
    pub fn process(&mut self, input: f32) -> Frame {
        let out = Frame::new(input * self.gain_left, input * self.gain_right);
        self.meter.process(out);
        out
    }

    pub fn level_db(&self) -> f32 {
        self.meter.level_db()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_pan_is_unity() {
        let mut strip = ChannelStrip::new(44100.0);
        let out = strip.process(0.5);
        assert!((out.left - 0.5).abs() < 1e-6);
        assert!((out.right - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hard_left_silences_right() {
        let mut strip = ChannelStrip::new(44100.0);
        strip.set_params(TrackParams { pan: -1.0, ..TrackParams::default() });
        let out = strip.process(1.0);
        assert!(out.right.abs() < 1e-6);
        assert!(out.left > 1.0);
    }

    #[test]
    fn muted_channel_outputs_exact_zero() {
        let mut strip = ChannelStrip::new(44100.0);
        strip.set_params(TrackParams { mute_effective: true, ..TrackParams::default() });
        assert!(strip.process(1.0).is_silent());
        assert_eq!(strip.level_db(), f32::NEG_INFINITY);
    }

    #[test]
    fn volume_scales_gain() {
        let mut strip = ChannelStrip::new(44100.0);
        strip.set_params(TrackParams { volume_db: -6.0206, ..TrackParams::default() });
        assert!((strip.process(1.0).left - 0.5).abs() < 1e-4);
    }
}
