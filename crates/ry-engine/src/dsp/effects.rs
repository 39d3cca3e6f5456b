//! Bass insert effects: distortion, feedback delay and reverb.
//!
//! Every unit runs continuously and blends its output with the dry input by
//! its `wet` amount. At `wet == 0` the output equals the input exactly.

use std::f32::consts::PI;

use ry_ir::{
    DelaySettings, DistortionSettings, EffectSlot, EffectsState, Oversample, ReverbSettings, MAX_DELAY_SECONDS,
    MAX_FEEDBACK, MAX_PRE_DELAY, MAX_REVERB_DECAY,
};

use crate::Frame;

#[inline]
fn blend(dry: Frame, processed: Frame, wet: f32) -> Frame {
    dry * (1.0 - wet) + processed * wet
}

// === Distortion ===

/// Waveshaping distortion with optional oversampling.
#[derive(Clone, Debug)]
pub struct Distortion {
    wet: f32,
    amount: f32,
    oversample: Oversample,
    previous: Frame,
}

impl Distortion {
    pub fn new(slot: &EffectSlot<DistortionSettings>) -> Self {
        let mut d = Self { wet: 0.0, amount: 0.0, oversample: Oversample::None, previous: Frame::silence() };
        d.configure(slot);
        d
    }

    pub fn configure(&mut self, slot: &EffectSlot<DistortionSettings>) {
        self.wet = slot.wet.clamp(0.0, 1.0);
        self.amount = slot.settings.distortion.clamp(0.0, 1.0);
        self.oversample = slot.settings.oversample;
    }

    fn shape(&self, x: f32) -> f32 {
        let k = self.amount * 100.0;
        let deg = PI / 180.0;
        (3.0 + k) * x * 20.0 * deg / (PI + k * x.abs())
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let factor = self.oversample.factor();
        let shaped = if factor <= 1 {
            Frame::new(self.shape(input.left), self.shape(input.right))
        } else {
            // Linear upsample, shape, then average back down.
            let mut acc = Frame::silence();
            for i in 1..=factor {
                let t = i as f32 / factor as f32;
                let x = self.previous * (1.0 - t) + input * t;
                acc += Frame::new(self.shape(x.left), self.shape(x.right));
            }
            acc * (1.0 / factor as f32)
        };
        self.previous = input;
        blend(input, shaped, self.wet)
    }

    pub fn reset(&mut self) {
        self.previous = Frame::silence();
    }
}

// === Delay ===

#[derive(Clone, Debug)]
struct DelayLine {
    buffer: Vec<f32>,
    write: usize,
}

impl DelayLine {
    fn new(capacity: usize) -> Self {
        Self { buffer: vec![0.0; capacity.max(1)], write: 0 }
    }

    /// Sample written `delay` pushes ago.
    #[inline]
    fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len);
        self.buffer[(self.write + len - delay) % len]
    }

    #[inline]
    fn push(&mut self, x: f32) {
        self.buffer[self.write] = x;
        self.write = (self.write + 1) % self.buffer.len();
    }

    fn clear(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = 0.0);
    }
}

/// Stereo feedback delay.
#[derive(Clone, Debug)]
pub struct FeedbackDelay {
    wet: f32,
    feedback: f32,
    delay_samples: usize,
    sample_rate: f32,
    lines: [DelayLine; 2],
}

impl FeedbackDelay {
    pub fn new(slot: &EffectSlot<DelaySettings>, sample_rate: f32) -> Self {
        let capacity = (MAX_DELAY_SECONDS * sample_rate) as usize + 1;
        let mut d = Self {
            wet: 0.0,
            feedback: 0.0,
            delay_samples: 1,
            sample_rate,
            lines: [DelayLine::new(capacity), DelayLine::new(capacity)],
        };
        d.configure(slot);
        d
    }

    pub fn configure(&mut self, slot: &EffectSlot<DelaySettings>) {
        self.wet = slot.wet.clamp(0.0, 1.0);
        self.feedback = slot.settings.feedback.clamp(0.0, MAX_FEEDBACK);
        let time = slot.settings.delay_time.clamp(0.0, MAX_DELAY_SECONDS);
        self.delay_samples = ((time * self.sample_rate) as usize).max(1);
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let mut out = [0.0f32; 2];
        for (ch, x) in [input.left, input.right].into_iter().enumerate() {
            let line = &mut self.lines[ch];
            let y = line.read(self.delay_samples);
            line.push(x + y * self.feedback);
            out[ch] = y;
        }
        blend(input, Frame::new(out[0], out[1]), self.wet)
    }

    pub fn reset(&mut self) {
        self.lines.iter_mut().for_each(DelayLine::clear);
    }
}

// === Reverb ===

/// Comb lengths at 44.1 kHz.
const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];
/// Right channel tuning offset.
const STEREO_SPREAD: usize = 23;
const INPUT_GAIN: f32 = 0.05;
const ALLPASS_FEEDBACK: f32 = 0.5;
const DAMPING: f32 = 0.2;

#[derive(Clone, Debug)]
struct Comb {
    line: DelayLine,
    len: usize,
    gain: f32,
    filter_state: f32,
}

impl Comb {
    fn new(len: usize) -> Self {
        Self { line: DelayLine::new(len), len, gain: 0.0, filter_state: 0.0 }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = self.line.read(self.len);
        self.filter_state = y * (1.0 - DAMPING) + self.filter_state * DAMPING;
        self.line.push(x + self.filter_state * self.gain);
        y
    }
}

#[derive(Clone, Debug)]
struct Allpass {
    line: DelayLine,
    len: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self { line: DelayLine::new(len), len }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let delayed = self.line.read(self.len);
        let y = delayed - x;
        self.line.push(x + delayed * ALLPASS_FEEDBACK);
        y
    }
}

#[derive(Clone, Debug)]
struct ReverbChannel {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl ReverbChannel {
    fn new(sample_rate: f32, spread: usize) -> Self {
        let scale = sample_rate / 44_100.0;
        let len = |n: usize| (((n + spread) as f32 * scale) as usize).max(1);
        Self {
            combs: COMB_TUNING.iter().map(|&n| Comb::new(len(n))).collect(),
            allpasses: ALLPASS_TUNING.iter().map(|&n| Allpass::new(len(n))).collect(),
        }
    }

    fn set_decay(&mut self, decay: f32, sample_rate: f32) {
        for comb in &mut self.combs {
            // -60 dB after `decay` seconds.
            comb.gain = if decay <= 0.0 {
                0.0
            } else {
                10f32.powf(-3.0 * comb.len as f32 / (decay * sample_rate))
            };
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let input = x * INPUT_GAIN;
        let mut sum = 0.0;
        for comb in &mut self.combs {
            sum += comb.process(input);
        }
        self.allpasses.iter_mut().fold(sum, |acc, ap| ap.process(acc))
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.line.clear();
            comb.filter_state = 0.0;
        }
        for ap in &mut self.allpasses {
            ap.line.clear();
        }
    }
}

/// Stereo comb/allpass reverb with pre-delay.
#[derive(Clone, Debug)]
pub struct Reverb {
    wet: f32,
    sample_rate: f32,
    pre_delay_samples: usize,
    pre_delay: [DelayLine; 2],
    channels: [ReverbChannel; 2],
}

impl Reverb {
    pub fn new(slot: &EffectSlot<ReverbSettings>, sample_rate: f32) -> Self {
        let capacity = (MAX_PRE_DELAY * sample_rate) as usize + 1;
        let mut r = Self {
            wet: 0.0,
            sample_rate,
            pre_delay_samples: 1,
            pre_delay: [DelayLine::new(capacity), DelayLine::new(capacity)],
            channels: [ReverbChannel::new(sample_rate, 0), ReverbChannel::new(sample_rate, STEREO_SPREAD)],
        };
        r.configure(slot);
        r
    }

    pub fn configure(&mut self, slot: &EffectSlot<ReverbSettings>) {
        self.wet = slot.wet.clamp(0.0, 1.0);
        let decay = slot.settings.decay.clamp(0.0, MAX_REVERB_DECAY);
        for ch in &mut self.channels {
            ch.set_decay(decay, self.sample_rate);
        }
        let pre = slot.settings.pre_delay.clamp(0.0, MAX_PRE_DELAY);
        self.pre_delay_samples = ((pre * self.sample_rate) as usize).max(1);
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let mut out = [0.0f32; 2];
        for (ch, x) in [input.left, input.right].into_iter().enumerate() {
            let line = &mut self.pre_delay[ch];
            let delayed = line.read(self.pre_delay_samples);
            line.push(x);
            out[ch] = self.channels[ch].process(delayed);
        }
        blend(input, Frame::new(out[0], out[1]), self.wet)
    }

    pub fn reset(&mut self) {
        self.pre_delay.iter_mut().for_each(DelayLine::clear);
        self.channels.iter_mut().for_each(ReverbChannel::clear);
    }
}

// === Chain ===

/// Distortion, then delay, then reverb.
#[derive(Clone, Debug)]
pub struct EffectsChain {
    pub distortion: Distortion,
    pub delay: FeedbackDelay,
    pub reverb: Reverb,
}

impl EffectsChain {
    pub fn new(state: &EffectsState, sample_rate: f32) -> Self {
        Self {
            distortion: Distortion::new(&state.distortion),
            delay: FeedbackDelay::new(&state.delay, sample_rate),
            reverb: Reverb::new(&state.reverb, sample_rate),
        }
    }

    pub fn configure(&mut self, state: &EffectsState) {
        self.distortion.configure(&state.distortion);
        self.delay.configure(&state.delay);
        self.reverb.configure(&state.reverb);
    }

    #[inline]
    pub fn process(&mut self, input: Frame) -> Frame {
        let x = self.distortion.process(input);
        let x = self.delay.process(x);
        self.reverb.process(x)
    }

    pub fn reset(&mut self) {
        self.distortion.reset();
        self.delay.reset();
        self.reverb.reset();
    }
}
