//! Sample sources and decoded sample data.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::drum::DrumSynth;
use crate::track::DrumTrack;

/// Where a drum track's sample comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SampleSource {
    /// The built-in kit sound for a drum.
    Builtin { sound: DrumTrack },
    /// A WAV file on disk.
    File { path: PathBuf },
    /// A drum synth rendered on load.
    Synth { drum: DrumSynth },
}

impl SampleSource {
    pub fn builtin(sound: DrumTrack) -> Self {
        SampleSource::Builtin { sound }
    }

    /// Short human-readable label for logs.
    pub fn label(&self) -> String {
        match self {
            SampleSource::Builtin { sound } => format!("builtin:{sound}"),
            SampleSource::File { path } => format!("file:{}", path.display()),
            SampleSource::Synth { drum } => format!("synth:{}", drum.kind()),
        }
    }
}

/// Decoded mono sample data at its own sample rate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Length in frames.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.data.len() as f32 / self.sample_rate as f32
        }
    }

    /// Linearly interpolated read at a fractional frame position.
    pub fn read_interpolated(&self, position: f64) -> f32 {
        let index = position as usize;
        let frac = (position - index as f64) as f32;
        let a = self.data.get(index).copied().unwrap_or(0.0);
        let b = self.data.get(index + 1).copied().unwrap_or(0.0);
        a + (b - a) * frac
    }
}
