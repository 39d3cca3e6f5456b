//! Phase-accumulator oscillator.

use core::f32::consts::TAU;
use ry_ir::OscillatorType;

#[derive(Clone, Debug)]
pub struct Oscillator {
    pub kind: OscillatorType,
    phase: f32,
    increment: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(kind: OscillatorType, sample_rate: f32) -> Self {
        Self { kind, phase: 0.0, increment: 0.0, sample_rate }
    }

    pub fn set_frequency(&mut self, hz: f32) {
        self.increment = (hz / self.sample_rate).clamp(0.0, 0.5);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce the next sample in -1..1 and advance.
    pub fn next_sample(&mut self) -> f32 {
        let out = waveform(self.kind, self.phase);
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }
}

/// Evaluate a waveform at `phase` in 0..1.
pub fn waveform(kind: OscillatorType, phase: f32) -> f32 {
    match kind {
        OscillatorType::Sine => (phase * TAU).sin(),
        OscillatorType::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        OscillatorType::Sawtooth => 2.0 * phase - 1.0,
        OscillatorType::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveforms_stay_in_range() {
        for kind in [OscillatorType::Sine, OscillatorType::Square, OscillatorType::Sawtooth, OscillatorType::Triangle] {
            for i in 0..100 {
                let v = waveform(kind, i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&v), "{kind:?} at {i}: {v}");
            }
        }
    }

    #[test]
    fn square_period_matches_frequency() {
        let mut osc = Oscillator::new(OscillatorType::Square, 100.0);
        osc.set_frequency(10.0);
        let samples: Vec<f32> = (0..10).map(|_| osc.next_sample()).collect();
        assert_eq!(&samples[..5], &[1.0; 5]);
        assert_eq!(&samples[5..], &[-1.0; 5]);
    }
}
