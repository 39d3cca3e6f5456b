//! Commands sent from the controller to the audio thread.

use crossbeam_channel::Sender;
use ry_engine::Player;
use ry_ir::{DrumTrack, EffectsState, Layout, MasterSettings, PerTrack, SampleBuffer, SynthState, TrackSettings};

#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    UpdateLayout(Box<Layout>),
    SetBpm(f32),
    SetTrackSettings(PerTrack<TrackSettings>),
    SetMaster(MasterSettings),
    SetBassEffects(EffectsState),
    SetBassSynth(SynthState),
    /// A fully decoded buffer, swapped in as one step.
    ReplaceSample(DrumTrack, SampleBuffer),
    Preview(SampleBuffer),
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    /// Reply with the current master spectrum.
    Spectrum(Sender<Vec<f32>>),
}

impl Command {
    pub fn apply(self, player: &mut Player) {
        match self {
            Command::Start => player.start(),
            Command::Stop => player.stop(),
            Command::UpdateLayout(layout) => player.update_layout(*layout),
            Command::SetBpm(bpm) => player.set_bpm(bpm),
            Command::SetTrackSettings(settings) => player.engine_mut().apply_track_settings(&settings),
            Command::SetMaster(master) => player.engine_mut().set_master_params(&master),
            Command::SetBassEffects(effects) => player.engine_mut().set_bass_effects(&effects),
            Command::SetBassSynth(synth) => player.engine_mut().set_bass_synth(&synth),
            Command::ReplaceSample(drum, buffer) => player.engine_mut().replace_sample(drum, buffer),
            Command::Preview(buffer) => player.engine_mut().preview(buffer),
            Command::NoteOn { note, velocity } => player.note_on(note, velocity),
            Command::NoteOff { note } => player.note_off(note),
            Command::Spectrum(reply) => {
                // The caller may have given up waiting.
                let _ = reply.send(player.engine().read_spectrum());
            }
        }
    }
}
