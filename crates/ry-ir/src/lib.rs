//! Core data model for the rythmai sequencer.
//!
//! This crate defines the layout that is edited, persisted, played live and
//! rendered offline: patterns, arrangement, mixer, effects and synth settings,
//! together with the typed update commands used to change them.

mod audio_buffer;
mod drum;
mod effects;
mod error;
mod layout;
mod master;
mod pattern;
pub mod persist;
mod pitch;
mod sample;
mod synth;
mod track;

pub use audio_buffer::AudioBuffer;
pub use drum::{
    DrumSynth, DrumSynthKind, MembraneSettings, MetalSettings, NoiseColor, NoiseSettings, MAX_DRUM_SECONDS,
};
pub use effects::{
    DelaySettings, DistortionSettings, EffectParam, EffectSlot, EffectsState, Oversample, ReverbSettings,
    MAX_DELAY_SECONDS, MAX_FEEDBACK, MAX_PRE_DELAY, MAX_REVERB_DECAY,
};
pub use error::{LayoutError, LayoutResult};
pub use layout::{bar_seconds, clamp_bpm, step_seconds, Layout, BEATS_PER_BAR, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use master::{CompressorSettings, LimiterSettings, MasterParam, MasterSettings};
pub use pattern::{
    clamp_volume_db, BassSteps, ChordSteps, DrumSteps, Pattern, Prompt, SequencerState, TrackParam, TrackSettings,
    TrackState, MAX_VOLUME_DB, MIN_VOLUME_DB, PROMPT_SLOTS, STEPS_PER_BAR,
};
pub use pitch::{midi_to_frequency, Chord, ChordQuality, Pitch, CHORD_BASE_NOTE, MAX_CHORD_NOTES};
pub use sample::{SampleBuffer, SampleSource};
pub use synth::{
    Adsr, FilterEnvelope, FilterSettings, FilterType, OscillatorType, Rolloff, SynthParam, SynthState,
};
pub use track::{DrumTrack, PerDrum, PerTrack, Track};
