//! The layout: patterns, arrangement, tempo, samples and master settings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::master::MasterSettings;
use crate::pattern::{DrumSteps, Pattern, SequencerState, TrackState, STEPS_PER_BAR};
use crate::sample::SampleSource;
use crate::track::{DrumTrack, PerDrum};

/// Beats (quarter notes) in one bar.
pub const BEATS_PER_BAR: u32 = 4;

pub const DEFAULT_BPM: f32 = 120.0;
pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 300.0;

/// Root aggregate of everything that is persisted and played.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    /// One entry per timeline bar: a pattern index or silence.
    #[serde(default)]
    pub arrangement: Vec<Option<usize>>,
    #[serde(default = "default_bpm")]
    pub bpm: f32,
    #[serde(default = "default_samples", deserialize_with = "deserialize_samples")]
    pub sample_settings: PerDrum<SampleSource>,
    #[serde(default)]
    pub master_settings: MasterSettings,
}

fn default_bpm() -> f32 {
    DEFAULT_BPM
}

fn default_samples() -> PerDrum<SampleSource> {
    PerDrum::from_fn(SampleSource::builtin)
}

/// Drums missing from `sampleSettings` get their built-in sound.
fn deserialize_samples<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PerDrum<SampleSource>, D::Error> {
    let mut partial = PerDrum::<Option<SampleSource>>::deserialize(deserializer)?;
    Ok(PerDrum::from_fn(|drum| partial[drum].take().unwrap_or_else(|| SampleSource::builtin(drum))))
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            patterns: vec![Pattern::starter()],
            arrangement: vec![Some(0); 4],
            bpm: DEFAULT_BPM,
            sample_settings: default_samples(),
            master_settings: MasterSettings::default(),
        }
    }
}

impl Pattern {
    /// A four-on-the-floor beat with a simple bassline.
    pub fn starter() -> Self {
        let mut bass = TrackState::default();
        for (step, note) in [(0, "C2"), (3, "C2"), (6, "G1"), (10, "A#1"), (12, "C2")] {
            bass.steps[step] = note.parse().ok();
        }
        let mut chords = TrackState::default();
        chords.steps[0] = "Cm".parse().ok();
        chords.steps[8] = "G#".parse().ok();
        Pattern {
            sequencer_state: SequencerState {
                kick: DrumSteps::hits(&[0, 4, 8, 12]),
                snare: DrumSteps::hits(&[4, 12]),
                hihat: DrumSteps::hits(&[2, 6, 10, 14]),
                bass,
                chords,
            },
            ..Pattern::default()
        }
    }
}

impl Layout {
    /// Duration of one bar in seconds.
    pub fn bar_seconds(&self) -> f64 {
        bar_seconds(self.bpm)
    }

    /// Total duration of one pass through the arrangement, in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.bar_seconds() * self.arrangement.len() as f64
    }

    /// The pattern scheduled for `bar`, if the bar is not empty.
    pub fn pattern_at(&self, bar: usize) -> Option<(usize, &Pattern)> {
        let index = (*self.arrangement.get(bar)?)?;
        self.patterns.get(index).map(|p| (index, p))
    }

    pub fn sample_source(&self, drum: DrumTrack) -> &SampleSource {
        &self.sample_settings[drum]
    }

    /// Drum tracks whose sample source differs from `previous`.
    pub fn changed_samples(&self, previous: &Layout) -> Vec<DrumTrack> {
        DrumTrack::ALL
            .into_iter()
            .filter(|d| self.sample_settings[*d] != previous.sample_settings[*d])
            .collect()
    }
}

/// Duration of one bar at `bpm`, in seconds.
pub fn bar_seconds(bpm: f32) -> f64 {
    60.0 / clamp_bpm(bpm) as f64 * BEATS_PER_BAR as f64
}

/// Duration of one step at `bpm`, in seconds.
pub fn step_seconds(bpm: f32) -> f64 {
    bar_seconds(bpm) / STEPS_PER_BAR as f64
}

pub fn clamp_bpm(bpm: f32) -> f32 {
    if bpm.is_finite() {
        bpm.clamp(MIN_BPM, MAX_BPM)
    } else {
        DEFAULT_BPM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_plays_four_bars() {
        let layout = Layout::default();
        assert_eq!(layout.arrangement.len(), 4);
        assert_eq!(layout.bar_seconds(), 2.0);
        assert_eq!(layout.total_seconds(), 8.0);
    }

    #[test]
    fn step_is_a_sixteenth() {
        assert_eq!(step_seconds(120.0), 0.125);
        assert_eq!(step_seconds(60.0), 0.25);
    }

    #[test]
    fn pattern_at_skips_gaps() {
        let layout = Layout { arrangement: vec![Some(0), None], ..Layout::default() };
        assert!(layout.pattern_at(0).is_some());
        assert!(layout.pattern_at(1).is_none());
        assert!(layout.pattern_at(7).is_none());
    }

    #[test]
    fn changed_samples_compares_sources() {
        let before = Layout::default();
        let mut after = before.clone();
        after.sample_settings.snare = SampleSource::File { path: "snare.wav".into() };
        assert_eq!(after.changed_samples(&before), vec![DrumTrack::Snare]);
        assert!(before.changed_samples(&before).is_empty());
    }

    #[test]
    fn bpm_is_clamped() {
        assert_eq!(clamp_bpm(1000.0), MAX_BPM);
        assert_eq!(clamp_bpm(f32::NAN), DEFAULT_BPM);
    }
}
