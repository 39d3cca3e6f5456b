//! Patterns: one bar of sequencer, mixer, effects and synth state.

use serde::{Deserialize, Serialize};

use crate::effects::EffectsState;
use crate::pitch::{Chord, Pitch};
use crate::synth::SynthState;
use crate::track::{PerTrack, Track};

/// Steps in one bar; one step is a sixteenth note.
pub const STEPS_PER_BAR: usize = 16;

/// Number of prompt slots attached to a pattern.
pub const PROMPT_SLOTS: usize = 8;

/// Sixteen step values of one track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackState<T> {
    pub steps: [T; STEPS_PER_BAR],
}

impl<T: Default> Default for TrackState<T> {
    fn default() -> Self {
        Self { steps: core::array::from_fn(|_| T::default()) }
    }
}

impl<T> TrackState<T> {
    pub fn new(steps: [T; STEPS_PER_BAR]) -> Self {
        Self { steps }
    }
}

pub type DrumSteps = TrackState<bool>;
pub type BassSteps = TrackState<Option<Pitch>>;
pub type ChordSteps = TrackState<Option<Chord>>;

impl DrumSteps {
    /// Drum steps with hits at the given step indices.
    pub fn hits(indices: &[usize]) -> Self {
        let mut state = Self::default();
        for &i in indices {
            if let Some(step) = state.steps.get_mut(i) {
                *step = true;
            }
        }
        state
    }
}

/// Step data for every track, keyed by track name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SequencerState {
    #[serde(default)]
    pub kick: DrumSteps,
    #[serde(default)]
    pub snare: DrumSteps,
    #[serde(default)]
    pub hihat: DrumSteps,
    #[serde(default)]
    pub bass: BassSteps,
    #[serde(default)]
    pub chords: ChordSteps,
}

impl SequencerState {
    /// True if no track has anything on any step.
    pub fn is_empty(&self) -> bool {
        [&self.kick, &self.snare, &self.hihat]
            .iter()
            .all(|t| t.steps.iter().all(|s| !s))
            && self.bass.steps.iter().all(Option::is_none)
            && self.chords.steps.iter().all(Option::is_none)
    }
}

/// Mixer strip settings of one track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackSettings {
    pub volume_db: f32,
    /// -1 (left) to 1 (right).
    pub pan: f32,
    pub mute: bool,
    pub solo: bool,
}

/// One settable track field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackParam {
    VolumeDb(f32),
    Pan(f32),
    Mute(bool),
    Solo(bool),
}

/// Quietest volume a fader stores. Persisted layouts carry finite numbers only.
pub const MIN_VOLUME_DB: f32 = -100.0;
pub const MAX_VOLUME_DB: f32 = 12.0;

/// Clamp a fader level into `MIN_VOLUME_DB..=MAX_VOLUME_DB`; NaN is silence.
pub fn clamp_volume_db(db: f32) -> f32 {
    if db.is_nan() {
        MIN_VOLUME_DB
    } else {
        db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
    }
}

impl TrackSettings {
    pub fn apply(&mut self, param: TrackParam) {
        match param {
            TrackParam::VolumeDb(db) => self.volume_db = clamp_volume_db(db),
            TrackParam::Pan(p) => self.pan = if p.is_finite() { p.clamp(-1.0, 1.0) } else { 0.0 },
            TrackParam::Mute(m) => self.mute = m,
            TrackParam::Solo(s) => self.solo = s,
        }
    }
}

impl PerTrack<TrackSettings> {
    /// Resolve mute and solo into the effective mute of each track.
    ///
    /// If any track is soloed, every track without solo is silent regardless
    /// of its own mute flag. Otherwise each track's mute flag applies.
    pub fn effective_mutes(&self) -> PerTrack<bool> {
        let any_solo = self.iter().any(|(_, s)| s.solo);
        self.map(|_, s| if any_solo { !s.solo } else { s.mute })
    }
}

/// Opaque prompt attached to a pattern by the editing surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(pub serde_json::Value);

/// One bar's musical content and the settings applied while it plays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(default)]
    pub sequencer_state: SequencerState,
    #[serde(default)]
    pub prompts: [Option<Prompt>; PROMPT_SLOTS],
    #[serde(default)]
    pub track_settings: PerTrack<TrackSettings>,
    #[serde(default)]
    pub effects_state: EffectsState,
    #[serde(default)]
    pub synth_state: SynthState,
}

impl Pattern {
    pub fn track_settings(&self, track: Track) -> &TrackSettings {
        &self.track_settings[track]
    }
}
