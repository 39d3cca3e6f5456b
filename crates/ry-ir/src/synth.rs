//! Bass synthesizer configuration and its typed update commands.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorType {
    Sine,
    Square,
    #[default]
    Sawtooth,
    Triangle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
}

/// Filter slope in dB per octave; each 12 dB is one cascaded biquad stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rolloff {
    #[default]
    Db12,
    Db24,
    Db48,
}

impl Rolloff {
    pub fn stages(self) -> usize {
        match self {
            Rolloff::Db12 => 1,
            Rolloff::Db24 => 2,
            Rolloff::Db48 => 4,
        }
    }
}

impl TryFrom<i32> for Rolloff {
    type Error = String;

    fn try_from(db: i32) -> Result<Self, Self::Error> {
        match db {
            -12 => Ok(Rolloff::Db12),
            -24 => Ok(Rolloff::Db24),
            -48 => Ok(Rolloff::Db48),
            other => Err(format!("unsupported rolloff {other}")),
        }
    }
}

impl From<Rolloff> for i32 {
    fn from(r: Rolloff) -> i32 {
        match r {
            Rolloff::Db12 => -12,
            Rolloff::Db24 => -24,
            Rolloff::Db48 => -48,
        }
    }
}

/// Attack/decay/sustain/release envelope. Times in seconds, sustain 0..1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self { attack, decay, sustain, release }
    }

    /// Clamp every stage into a playable range.
    pub fn clamped(self) -> Self {
        Self {
            attack: clamp_time(self.attack),
            decay: clamp_time(self.decay),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: clamp_time(self.release),
        }
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(0.005, 0.1, 0.9, 1.0)
    }
}

pub(crate) fn clamp_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSettings {
    #[serde(rename = "type")]
    pub kind: FilterType,
    #[serde(rename = "Q", alias = "q")]
    pub q: f32,
    pub rolloff: Rolloff,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self { kind: FilterType::Lowpass, q: 1.0, rolloff: Rolloff::Db12 }
    }
}

/// Envelope driving the filter cutoff from `base_frequency` up `octaves` octaves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterEnvelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub base_frequency: f32,
    pub octaves: f32,
}

impl FilterEnvelope {
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }
}

impl Default for FilterEnvelope {
    fn default() -> Self {
        Self {
            attack: 0.6,
            decay: 0.2,
            sustain: 0.5,
            release: 2.0,
            base_frequency: 200.0,
            octaves: 3.0,
        }
    }
}

/// Complete bass synth configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SynthState {
    pub oscillator: OscillatorType,
    pub envelope: Adsr,
    pub filter: FilterSettings,
    pub filter_envelope: FilterEnvelope,
}

/// One settable bass synth field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SynthParam {
    Oscillator(OscillatorType),
    Attack(f32),
    Decay(f32),
    Sustain(f32),
    Release(f32),
    FilterType(FilterType),
    FilterQ(f32),
    FilterRolloff(Rolloff),
    FilterAttack(f32),
    FilterDecay(f32),
    FilterSustain(f32),
    FilterRelease(f32),
    FilterBaseFrequency(f32),
    FilterOctaves(f32),
}

impl SynthState {
    pub fn apply(&mut self, param: SynthParam) {
        match param {
            SynthParam::Oscillator(osc) => self.oscillator = osc,
            SynthParam::Attack(v) => self.envelope.attack = clamp_time(v),
            SynthParam::Decay(v) => self.envelope.decay = clamp_time(v),
            SynthParam::Sustain(v) => self.envelope.sustain = v.clamp(0.0, 1.0),
            SynthParam::Release(v) => self.envelope.release = clamp_time(v),
            SynthParam::FilterType(kind) => self.filter.kind = kind,
            SynthParam::FilterQ(v) => self.filter.q = v.clamp(0.0001, 30.0),
            SynthParam::FilterRolloff(r) => self.filter.rolloff = r,
            SynthParam::FilterAttack(v) => self.filter_envelope.attack = clamp_time(v),
            SynthParam::FilterDecay(v) => self.filter_envelope.decay = clamp_time(v),
            SynthParam::FilterSustain(v) => self.filter_envelope.sustain = v.clamp(0.0, 1.0),
            SynthParam::FilterRelease(v) => self.filter_envelope.release = clamp_time(v),
            SynthParam::FilterBaseFrequency(v) => {
                self.filter_envelope.base_frequency = v.clamp(20.0, 20_000.0)
            }
            SynthParam::FilterOctaves(v) => self.filter_envelope.octaves = v.clamp(0.0, 8.0),
        }
    }

    /// Check every field is finite and within range.
    pub fn validate(&self) -> Result<(), String> {
        let times = [
            ("envelope.attack", self.envelope.attack),
            ("envelope.decay", self.envelope.decay),
            ("envelope.release", self.envelope.release),
            ("filterEnvelope.attack", self.filter_envelope.attack),
            ("filterEnvelope.decay", self.filter_envelope.decay),
            ("filterEnvelope.release", self.filter_envelope.release),
        ];
        for (name, t) in times {
            if !t.is_finite() || !(0.0..=10.0).contains(&t) {
                return Err(format!("{name} out of range: {t}"));
            }
        }
        for (name, s) in [("envelope.sustain", self.envelope.sustain), ("filterEnvelope.sustain", self.filter_envelope.sustain)] {
            if !(0.0..=1.0).contains(&s) {
                return Err(format!("{name} out of range: {s}"));
            }
        }
        if !(self.filter.q > 0.0 && self.filter.q <= 30.0) {
            return Err(format!("filter.Q out of range: {}", self.filter.q));
        }
        if !(20.0..=20_000.0).contains(&self.filter_envelope.base_frequency) {
            return Err(format!("filterEnvelope.baseFrequency out of range: {}", self.filter_envelope.base_frequency));
        }
        if !(0.0..=8.0).contains(&self.filter_envelope.octaves) {
            return Err(format!("filterEnvelope.octaves out of range: {}", self.filter_envelope.octaves));
        }
        Ok(())
    }
}
