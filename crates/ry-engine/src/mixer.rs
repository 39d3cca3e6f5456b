//! Main engine: voice pool feeding the signal graph.

use ry_ir::{
    DrumTrack, EffectsState, MasterSettings, Pattern, PerTrack, SampleBuffer, SynthState, Track, TrackSettings,
};

use crate::channel::TrackParams;
use crate::event::{Event, EventPayload, EventTarget};
use crate::frame::Frame;
use crate::graph::SignalGraph;
use crate::transport::MeterLevels;
use crate::voice_pool::VoicePool;

/// One self-contained instance of the instruments and mixer.
pub struct Engine {
    voices: VoicePool,
    graph: SignalGraph,
    sample_rate: u32,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        let sr = sample_rate as f32;
        Self {
            voices: VoicePool::new(&SynthState::default(), sr),
            graph: SignalGraph::new(&MasterSettings::default(), &EffectsState::default(), sr),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    // === Parameter setters ===

    pub fn set_track_params(&mut self, track: Track, params: TrackParams) {
        self.graph.set_track_params(track, params);
    }

    pub fn track_params(&self, track: Track) -> TrackParams {
        self.graph.track_params(track)
    }

    pub fn apply_track_settings(&mut self, settings: &PerTrack<TrackSettings>) {
        self.graph.apply_track_settings(settings);
    }

    pub fn set_master_params(&mut self, master: &MasterSettings) {
        self.graph.set_master_params(master);
    }

    pub fn set_bass_effects(&mut self, effects: &EffectsState) {
        self.graph.set_bass_effects(effects);
    }

    pub fn set_bass_synth(&mut self, synth: &SynthState) {
        self.voices.bass.set_state(synth);
    }

    pub fn bass_synth(&self) -> &SynthState {
        self.voices.bass.state()
    }

    /// Mixer, effects and synth settings of a pattern.
    pub fn apply_pattern(&mut self, pattern: &Pattern) {
        self.apply_track_settings(&pattern.track_settings);
        self.set_bass_effects(&pattern.effects_state);
        self.set_bass_synth(&pattern.synth_state);
    }

    pub fn replace_sample(&mut self, drum: DrumTrack, buffer: SampleBuffer) {
        log::debug!(target: "engine", "replacing {drum} sample ({} frames)", buffer.len());
        self.voices.replace_sample(drum, buffer);
    }

    pub fn has_sample(&self, drum: DrumTrack) -> bool {
        self.voices.has_sample(drum)
    }

    pub fn preview(&mut self, buffer: SampleBuffer) {
        self.voices.preview(buffer);
    }

    // === Meters ===

    pub fn read_meter(&self, track: Track) -> f32 {
        self.graph.read_meter(track)
    }

    pub fn read_master_meter(&self) -> f32 {
        self.graph.read_master_meter()
    }

    pub fn meter_levels(&self) -> MeterLevels {
        MeterLevels { tracks: PerTrack::from_fn(|t| self.read_meter(t)), master: self.read_master_meter() }
    }

    pub fn read_spectrum(&self) -> Vec<f32> {
        self.graph.read_spectrum()
    }

    pub fn reset_meters(&mut self) {
        self.graph.reset_meters();
    }

    // === Notes ===

    /// Live note on the bass synth.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.voices.bass.trigger_attack(note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        self.voices.bass.note_off(note);
    }

    pub fn release_bass(&mut self) {
        self.voices.bass.trigger_release();
    }

    /// Release held synth notes; samples play out.
    pub fn release_all(&mut self) {
        self.voices.bass.trigger_release();
        self.voices.chords.release_all();
    }

    /// Silence every instrument immediately.
    pub fn silence(&mut self) {
        self.voices.stop_all();
    }

    /// Apply an instrument event. UI events are ignored here.
    pub fn dispatch(&mut self, event: &Event) {
        let EventTarget::Instrument(track) = event.target else {
            return;
        };
        match (&event.payload, track) {
            (EventPayload::Trigger { velocity }, track) => {
                if let Some(drum) = track.as_drum() {
                    self.voices.trigger_drum(drum, *velocity);
                }
            }
            (EventPayload::AttackRelease { notes, duration_frames, velocity }, Track::Bass) => {
                if let Some(pitch) = notes.first() {
                    self.voices.bass.trigger_attack_release(*pitch, *duration_frames, *velocity);
                }
            }
            (EventPayload::AttackRelease { notes, duration_frames, velocity }, Track::Chords) => {
                self.voices.chords.trigger_attack_release(notes, *duration_frames, *velocity);
            }
            (EventPayload::Release, Track::Bass) => self.voices.bass.trigger_release(),
            (EventPayload::Release, Track::Chords) => self.voices.chords.release_all(),
            _ => {}
        }
    }

    /// Generate one frame of audio.
    #[inline]
    pub fn render_frame(&mut self) -> Frame {
        let voices = self.voices.render();
        self.graph.process(&voices)
    }
}
