//! Offline drum synthesis: membrane, noise and metal voices rendered to a
//! mono buffer. Output is deterministic for a given description.

use std::f32::consts::TAU;

use ry_ir::{DrumSynth, MembraneSettings, MetalSettings, NoiseColor, NoiseSettings, OscillatorType};

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::{Biquad, BiquadCoeffs};
use crate::dsp::oscillator::waveform;

/// Fixed seed so noise-based sounds render identically every time.
const NOISE_SEED: u64 = 0x5259_5448_4d41_4921;

/// Fade applied to the tail so renders end on silence.
const END_FADE_SECONDS: f32 = 0.005;

/// Frequency ratios of the metal partials.
const METAL_RATIOS: [f32; 6] = [1.0, 1.483, 1.932, 2.546, 2.630, 3.897];

/// Render a drum description to mono samples at `sample_rate`.
pub fn render_drum(drum: &DrumSynth, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let frames = (drum.duration().max(0.0) * sr).round() as usize;
    let mut env = Envelope::new(drum.envelope(), sr);
    let adsr = drum.envelope().clamped();
    let gate_frames = ((adsr.attack + adsr.decay) * sr) as usize;

    let mut out = match drum {
        DrumSynth::Membrane(s) => render_membrane(s, &mut env, gate_frames, frames, sr),
        DrumSynth::Noise(s) => render_noise(s, &mut env, gate_frames, frames),
        DrumSynth::Metal(s) => render_metal(s, &mut env, gate_frames, frames, sr),
    };
    apply_end_fade(&mut out, (END_FADE_SECONDS * sr) as usize);
    log::debug!(target: "drum", "rendered {} drum: {} frames", drum.kind(), out.len());
    out
}

/// Step the envelope, releasing the gate once `gate_frames` have passed.
fn envelope_at(env: &mut Envelope, frame: usize, gate_frames: usize) -> f32 {
    if frame == 0 {
        env.gate_on();
    }
    if frame == gate_frames {
        env.gate_off();
    }
    env.next_value()
}

fn render_membrane(
    s: &MembraneSettings,
    env: &mut Envelope,
    gate_frames: usize,
    frames: usize,
    sr: f32,
) -> Vec<f32> {
    let mut phase = 0.0f32;
    (0..frames)
        .map(|i| {
            let t = i as f32 / sr;
            let sweep = if s.pitch_decay > 0.0 { (1.0 - t / s.pitch_decay).max(0.0) } else { 0.0 };
            let freq = s.frequency * 2f32.powf(s.octaves * sweep);
            let value = waveform(s.oscillator, phase) * envelope_at(env, i, gate_frames);
            phase = (phase + freq / sr).fract();
            value
        })
        .collect()
}

/// Colored noise source.
struct NoiseSource {
    rng: fastrand::Rng,
    color: NoiseColor,
    pink: [f32; 7],
    brown: f32,
}

impl NoiseSource {
    fn new(color: NoiseColor) -> Self {
        Self { rng: fastrand::Rng::with_seed(NOISE_SEED), color, pink: [0.0; 7], brown: 0.0 }
    }

    fn next(&mut self) -> f32 {
        let white = self.rng.f32() * 2.0 - 1.0;
        match self.color {
            NoiseColor::White => white,
            NoiseColor::Pink => {
                // Paul Kellet's refined filter.
                let b = &mut self.pink;
                b[0] = 0.99886 * b[0] + white * 0.0555179;
                b[1] = 0.99332 * b[1] + white * 0.0750759;
                b[2] = 0.96900 * b[2] + white * 0.1538520;
                b[3] = 0.86650 * b[3] + white * 0.3104856;
                b[4] = 0.55000 * b[4] + white * 0.5329522;
                b[5] = -0.7616 * b[5] - white * 0.0168980;
                let pink = b.iter().sum::<f32>() + white * 0.5362;
                b[6] = white * 0.115926;
                pink * 0.11
            }
            NoiseColor::Brown => {
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * 3.5
            }
        }
    }
}

fn render_noise(s: &NoiseSettings, env: &mut Envelope, gate_frames: usize, frames: usize) -> Vec<f32> {
    let mut noise = NoiseSource::new(s.noise);
    (0..frames).map(|i| noise.next() * envelope_at(env, i, gate_frames)).collect()
}

fn render_metal(s: &MetalSettings, env: &mut Envelope, gate_frames: usize, frames: usize, sr: f32) -> Vec<f32> {
    let mut carriers = [0.0f32; METAL_RATIOS.len()];
    let mut modulators = [0.0f32; METAL_RATIOS.len()];
    let mut highpass = Biquad::default();
    let depth = s.modulation_index / TAU;

    (0..frames)
        .map(|i| {
            let level = envelope_at(env, i, gate_frames);
            if i % 32 == 0 {
                let cutoff = s.resonance * 2f32.powf(level * s.octaves);
                highpass.set_coeffs(BiquadCoeffs::highpass(cutoff, 1.0, sr));
            }
            let mut sum = 0.0;
            for (k, ratio) in METAL_RATIOS.iter().enumerate() {
                let freq = s.frequency * ratio;
                let m = (modulators[k] * TAU).sin();
                sum += waveform(OscillatorType::Square, (carriers[k] + depth * m).rem_euclid(1.0));
                carriers[k] = (carriers[k] + freq / sr).fract();
                modulators[k] = (modulators[k] + freq * s.harmonicity / sr).fract();
            }
            highpass.process(sum / METAL_RATIOS.len() as f32) * level
        })
        .collect()
}

fn apply_end_fade(samples: &mut [f32], fade: usize) {
    let fade = fade.min(samples.len());
    if fade == 0 {
        return;
    }
    let start = samples.len() - fade;
    for (i, s) in samples[start..].iter_mut().enumerate() {
        *s *= 1.0 - (i + 1) as f32 / fade as f32;
    }
}
