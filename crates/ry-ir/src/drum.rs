//! Drum synthesizer descriptions used to render drum samples.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::synth::{Adsr, OscillatorType};
use crate::track::DrumTrack;

/// Longest drum sample that may be rendered, in seconds.
pub const MAX_DRUM_SECONDS: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumSynthKind {
    /// Pitched sine with a falling pitch sweep (kicks, toms).
    Membrane,
    /// Filtered noise burst (snares, claps).
    Noise,
    /// Inharmonic FM cluster (hats, cymbals).
    Metal,
}

impl DrumSynthKind {
    pub const ALL: [DrumSynthKind; 3] = [DrumSynthKind::Membrane, DrumSynthKind::Noise, DrumSynthKind::Metal];

    pub fn name(self) -> &'static str {
        match self {
            DrumSynthKind::Membrane => "membrane",
            DrumSynthKind::Noise => "noise",
            DrumSynthKind::Metal => "metal",
        }
    }
}

impl fmt::Display for DrumSynthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrumSynthKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrumSynthKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown drum synth '{s}'"))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    #[default]
    White,
    Pink,
    Brown,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MembraneSettings {
    /// Resting pitch in Hz.
    pub frequency: f32,
    /// Seconds taken to fall from the top of the sweep to `frequency`.
    pub pitch_decay: f32,
    /// Sweep start, in octaves above `frequency`.
    pub octaves: f32,
    #[serde(default = "membrane_oscillator")]
    pub oscillator: OscillatorType,
    pub envelope: Adsr,
    /// Rendered length in seconds.
    pub duration: f32,
}

fn membrane_oscillator() -> OscillatorType {
    OscillatorType::Sine
}

impl Default for MembraneSettings {
    fn default() -> Self {
        Self {
            frequency: 50.0,
            pitch_decay: 0.05,
            octaves: 4.0,
            oscillator: OscillatorType::Sine,
            envelope: Adsr::new(0.001, 0.4, 0.01, 0.1),
            duration: 0.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoiseSettings {
    #[serde(default)]
    pub noise: NoiseColor,
    pub envelope: Adsr,
    pub duration: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            noise: NoiseColor::White,
            envelope: Adsr::new(0.001, 0.15, 0.0, 0.05),
            duration: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetalSettings {
    /// Base frequency of the partial cluster in Hz.
    pub frequency: f32,
    /// Modulator to carrier frequency ratio.
    pub harmonicity: f32,
    pub modulation_index: f32,
    /// Highpass cutoff in Hz.
    pub resonance: f32,
    /// Cutoff sweep range in octaves above `resonance`.
    pub octaves: f32,
    pub envelope: Adsr,
    pub duration: f32,
}

impl Default for MetalSettings {
    fn default() -> Self {
        Self {
            frequency: 200.0,
            harmonicity: 5.1,
            modulation_index: 32.0,
            resonance: 4000.0,
            octaves: 1.5,
            envelope: Adsr::new(0.001, 0.1, 0.0, 0.01),
            duration: 0.2,
        }
    }
}

/// A drum synth and its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "synth", rename_all = "lowercase")]
pub enum DrumSynth {
    Membrane(MembraneSettings),
    Noise(NoiseSettings),
    Metal(MetalSettings),
}

impl DrumSynth {
    pub fn kind(&self) -> DrumSynthKind {
        match self {
            DrumSynth::Membrane(_) => DrumSynthKind::Membrane,
            DrumSynth::Noise(_) => DrumSynthKind::Noise,
            DrumSynth::Metal(_) => DrumSynthKind::Metal,
        }
    }

    pub fn default_for(kind: DrumSynthKind) -> Self {
        match kind {
            DrumSynthKind::Membrane => DrumSynth::Membrane(MembraneSettings::default()),
            DrumSynthKind::Noise => DrumSynth::Noise(NoiseSettings::default()),
            DrumSynthKind::Metal => DrumSynth::Metal(MetalSettings::default()),
        }
    }

    /// The built-in kit sound for a drum track.
    pub fn builtin(drum: DrumTrack) -> Self {
        match drum {
            DrumTrack::Kick => Self::default_for(DrumSynthKind::Membrane),
            DrumTrack::Snare => Self::default_for(DrumSynthKind::Noise),
            DrumTrack::Hihat => Self::default_for(DrumSynthKind::Metal),
        }
    }

    pub fn duration(&self) -> f32 {
        match self {
            DrumSynth::Membrane(s) => s.duration,
            DrumSynth::Noise(s) => s.duration,
            DrumSynth::Metal(s) => s.duration,
        }
    }

    pub fn envelope(&self) -> Adsr {
        match self {
            DrumSynth::Membrane(s) => s.envelope,
            DrumSynth::Noise(s) => s.envelope,
            DrumSynth::Metal(s) => s.envelope,
        }
    }

    /// Check every field is finite and within range.
    pub fn validate(&self) -> Result<(), String> {
        let duration = self.duration();
        if !(duration > 0.0 && duration <= MAX_DRUM_SECONDS) {
            return Err(format!("duration out of range: {duration}"));
        }
        let env = self.envelope();
        if env.clamped() != env {
            return Err(format!("envelope out of range: {env:?}"));
        }
        let positive = |name: &str, v: f32, max: f32| {
            if v.is_finite() && v > 0.0 && v <= max {
                Ok(())
            } else {
                Err(format!("{name} out of range: {v}"))
            }
        };
        match self {
            DrumSynth::Membrane(s) => {
                positive("frequency", s.frequency, 2_000.0)?;
                positive("pitchDecay", s.pitch_decay, MAX_DRUM_SECONDS)?;
                if !(0.0..=8.0).contains(&s.octaves) {
                    return Err(format!("octaves out of range: {}", s.octaves));
                }
            }
            DrumSynth::Noise(_) => {}
            DrumSynth::Metal(s) => {
                positive("frequency", s.frequency, 5_000.0)?;
                positive("harmonicity", s.harmonicity, 20.0)?;
                positive("modulationIndex", s.modulation_index, 100.0)?;
                positive("resonance", s.resonance, 20_000.0)?;
                if !(0.0..=8.0).contains(&s.octaves) {
                    return Err(format!("octaves out of range: {}", s.octaves));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kit_is_valid() {
        for drum in DrumTrack::ALL {
            assert!(DrumSynth::builtin(drum).validate().is_ok());
        }
    }

    #[test]
    fn tagged_by_synth_kind() {
        let json = serde_json::to_value(DrumSynth::default_for(DrumSynthKind::Metal)).unwrap();
        assert_eq!(json["synth"], "metal");
        assert_eq!(json["modulationIndex"], 32.0);
        let back: DrumSynth = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), DrumSynthKind::Metal);
    }

    #[test]
    fn rejects_overlong_render() {
        let mut s = NoiseSettings::default();
        s.duration = 30.0;
        assert!(DrumSynth::Noise(s).validate().is_err());
    }

    #[test]
    fn kind_parses_from_name() {
        assert_eq!("Membrane".parse::<DrumSynthKind>().unwrap(), DrumSynthKind::Membrane);
        assert!("cowbell".parse::<DrumSynthKind>().is_err());
    }
}
