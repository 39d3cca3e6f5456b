//! Biquad filters in transposed direct form II.

use std::f32::consts::PI;

use ry_ir::{FilterType, Rolloff};

/// Normalized biquad coefficients (a0 = 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for BiquadCoeffs {
    /// Pass-through.
    fn default() -> Self {
        Self { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0 }
    }
}

impl BiquadCoeffs {
    pub fn new(kind: FilterType, freq: f32, q: f32, sample_rate: f32) -> Self {
        // Keep the cutoff below Nyquist and Q positive.
        let freq = freq.clamp(10.0, sample_rate * 0.49);
        let q = q.max(1e-4);
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let alpha = sin_w / (2.0 * q);

        let (b0, b1, b2) = match kind {
            FilterType::Lowpass => ((1.0 - cos_w) / 2.0, 1.0 - cos_w, (1.0 - cos_w) / 2.0),
            FilterType::Highpass => ((1.0 + cos_w) / 2.0, -(1.0 + cos_w), (1.0 + cos_w) / 2.0),
            FilterType::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: (-2.0 * cos_w) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    pub fn lowpass(freq: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::Lowpass, freq, q, sample_rate)
    }

    pub fn highpass(freq: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::Highpass, freq, q, sample_rate)
    }
}

/// Single biquad section.
#[derive(Clone, Debug, Default)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, z1: 0.0, z2: 0.0 }
    }

    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }
}

/// Cascade of identical biquads giving a 12/24/48 dB per octave slope.
#[derive(Clone, Debug)]
pub struct Filter {
    kind: FilterType,
    q: f32,
    sample_rate: f32,
    stages: Vec<Biquad>,
}

impl Filter {
    pub fn new(kind: FilterType, q: f32, rolloff: Rolloff, sample_rate: f32) -> Self {
        Self {
            kind,
            q,
            sample_rate,
            stages: vec![Biquad::default(); rolloff.stages()],
        }
    }

    pub fn configure(&mut self, kind: FilterType, q: f32, rolloff: Rolloff) {
        self.kind = kind;
        self.q = q;
        if self.stages.len() != rolloff.stages() {
            self.stages = vec![Biquad::default(); rolloff.stages()];
        }
    }

    pub fn set_cutoff(&mut self, freq: f32) {
        let coeffs = BiquadCoeffs::new(self.kind, freq, self.q, self.sample_rate);
        for stage in &mut self.stages {
            stage.set_coeffs(coeffs);
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn reset(&mut self) {
        self.stages.iter_mut().for_each(Biquad::reset);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.stages.iter_mut().fold(input, |x, stage| stage.process(x))
    }
}
