//! Bass effects chain settings and typed update commands.

use serde::{Deserialize, Serialize};

/// Waveshaper oversampling factor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oversample {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "4x")]
    X4,
}

impl Oversample {
    pub fn factor(self) -> usize {
        match self {
            Oversample::None => 1,
            Oversample::X2 => 2,
            Oversample::X4 => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DistortionSettings {
    /// Drive amount, 0..1.
    pub distortion: f32,
    #[serde(default)]
    pub oversample: Oversample,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self { distortion: 0.4, oversample: Oversample::None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DelaySettings {
    /// Delay time in seconds.
    pub delay_time: f32,
    pub feedback: f32,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self { delay_time: 0.25, feedback: 0.3 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReverbSettings {
    /// Decay time in seconds.
    pub decay: f32,
    /// Pre-delay in seconds.
    pub pre_delay: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self { decay: 1.5, pre_delay: 0.01 }
    }
}

/// Maximum delay line length in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;
/// Maximum feedback of the delay.
pub const MAX_FEEDBACK: f32 = 0.95;
/// Maximum reverb decay in seconds.
pub const MAX_REVERB_DECAY: f32 = 10.0;
/// Maximum reverb pre-delay in seconds.
pub const MAX_PRE_DELAY: f32 = 0.5;

/// An effect unit's wet amount and settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectSlot<S> {
    /// 0 = dry, 1 = fully processed.
    pub wet: f32,
    pub settings: S,
}

/// Settings of the bass effects chain, keyed by effect name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectsState {
    #[serde(default)]
    pub distortion: EffectSlot<DistortionSettings>,
    #[serde(default)]
    pub delay: EffectSlot<DelaySettings>,
    #[serde(default)]
    pub reverb: EffectSlot<ReverbSettings>,
}

/// One settable effects field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectParam {
    DistortionWet(f32),
    DistortionAmount(f32),
    DistortionOversample(Oversample),
    DelayWet(f32),
    DelayTime(f32),
    DelayFeedback(f32),
    ReverbWet(f32),
    ReverbDecay(f32),
    ReverbPreDelay(f32),
}

fn unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl EffectsState {
    pub fn apply(&mut self, param: EffectParam) {
        match param {
            EffectParam::DistortionWet(v) => self.distortion.wet = unit(v),
            EffectParam::DistortionAmount(v) => self.distortion.settings.distortion = unit(v),
            EffectParam::DistortionOversample(o) => self.distortion.settings.oversample = o,
            EffectParam::DelayWet(v) => self.delay.wet = unit(v),
            EffectParam::DelayTime(v) => {
                self.delay.settings.delay_time = v.clamp(0.0, MAX_DELAY_SECONDS)
            }
            EffectParam::DelayFeedback(v) => self.delay.settings.feedback = v.clamp(0.0, MAX_FEEDBACK),
            EffectParam::ReverbWet(v) => self.reverb.wet = unit(v),
            EffectParam::ReverbDecay(v) => self.reverb.settings.decay = v.clamp(0.001, MAX_REVERB_DECAY),
            EffectParam::ReverbPreDelay(v) => {
                self.reverb.settings.pre_delay = v.clamp(0.0, MAX_PRE_DELAY)
            }
        }
    }

    /// Check every field is finite and within range.
    pub fn validate(&self) -> Result<(), String> {
        for (name, wet) in [
            ("distortion.wet", self.distortion.wet),
            ("delay.wet", self.delay.wet),
            ("reverb.wet", self.reverb.wet),
            ("distortion.settings.distortion", self.distortion.settings.distortion),
        ] {
            if !(0.0..=1.0).contains(&wet) {
                return Err(format!("{name} out of range: {wet}"));
            }
        }
        let delay = self.delay.settings;
        if !(0.0..=MAX_DELAY_SECONDS).contains(&delay.delay_time) {
            return Err(format!("delay.settings.delayTime out of range: {}", delay.delay_time));
        }
        if !(0.0..=MAX_FEEDBACK).contains(&delay.feedback) {
            return Err(format!("delay.settings.feedback out of range: {}", delay.feedback));
        }
        let reverb = self.reverb.settings;
        if !(reverb.decay > 0.0 && reverb.decay <= MAX_REVERB_DECAY) {
            return Err(format!("reverb.settings.decay out of range: {}", reverb.decay));
        }
        if !(0.0..=MAX_PRE_DELAY).contains(&reverb.pre_delay) {
            return Err(format!("reverb.settings.preDelay out of range: {}", reverb.pre_delay));
        }
        Ok(())
    }
}
