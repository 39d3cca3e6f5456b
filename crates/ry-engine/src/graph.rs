//! Fixed signal graph: five channel strips, the bass effects chain and the
//! master bus with its meter and analyser taps.

use ry_ir::{EffectsState, MasterSettings, PerTrack, Track, TrackSettings};

use crate::channel::{ChannelStrip, TrackParams};
use crate::dsp::{db_to_gain, fader_gain};
use crate::dsp::dynamics::{Compressor, Limiter};
use crate::dsp::effects::EffectsChain;
use crate::dsp::meter::{Analyser, Meter};
use crate::frame::Frame;
use crate::voice_pool::VoiceOutputs;

pub struct SignalGraph {
    channels: PerTrack<ChannelStrip>,
    bass_fx: EffectsChain,
    master_gain: f32,
    compressor: Compressor,
    limiter: Limiter,
    master_meter: Meter,
    analyser: Analyser,
}

impl SignalGraph {
    pub fn new(master: &MasterSettings, effects: &EffectsState, sample_rate: f32) -> Self {
        Self {
            channels: PerTrack::from_fn(|_| ChannelStrip::new(sample_rate)),
            bass_fx: EffectsChain::new(effects, sample_rate),
            master_gain: fader_gain(master.volume_db),
            compressor: Compressor::new(&master.compressor, sample_rate),
            limiter: Limiter::new(&master.limiter, sample_rate),
            master_meter: Meter::new(sample_rate),
            analyser: Analyser::new(),
        }
    }

    pub fn set_track_params(&mut self, track: Track, params: TrackParams) {
        self.channels[track].set_params(params);
    }

    pub fn track_params(&self, track: Track) -> TrackParams {
        self.channels[track].params()
    }

    /// Apply a full set of track settings, resolving solo against mute.
    pub fn apply_track_settings(&mut self, settings: &PerTrack<TrackSettings>) {
        let mutes = settings.effective_mutes();
        for (track, s) in settings.iter() {
            self.set_track_params(
                track,
                TrackParams { volume_db: s.volume_db, pan: s.pan, mute_effective: mutes[track] },
            );
        }
    }

    pub fn set_master_params(&mut self, master: &MasterSettings) {
        self.master_gain = fader_gain(master.volume_db);
        self.compressor.set_settings(&master.compressor);
        self.limiter.set_settings(&master.limiter);
    }

    pub fn set_bass_effects(&mut self, effects: &EffectsState) {
        self.bass_fx.configure(effects);
    }

    /// Mix one frame of instrument output through to the master bus.
    #[inline]
    pub fn process(&mut self, voices: &VoiceOutputs) -> Frame {
        let ch = &mut self.channels;
        let mut sum = ch.kick.process(voices.kick);
        sum += ch.snare.process(voices.snare);
        sum += ch.hihat.process(voices.hihat);
        sum += ch.chords.process(voices.chords);
        sum += self.bass_fx.process(ch.bass.process(voices.bass));
        sum += Frame::mono(voices.preview);

        let out = self.limiter.process(self.compressor.process(sum * self.master_gain));
        self.master_meter.process(out);
        self.analyser.push(out);
        out
    }

    /// Channel level in dB.
    pub fn read_meter(&self, track: Track) -> f32 {
        self.channels[track].level_db()
    }

    pub fn read_master_meter(&self) -> f32 {
        self.master_meter.level_db()
    }

    pub fn read_spectrum(&self) -> Vec<f32> {
        self.analyser.read_spectrum()
    }

    pub fn reset_meters(&mut self) {
        for track in Track::ALL {
            self.channels[track].meter.reset();
        }
        self.master_meter.reset();
        self.analyser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> SignalGraph {
        SignalGraph::new(&MasterSettings::default(), &EffectsState::default(), 44100.0)
    }

    fn all_on() -> VoiceOutputs {
        VoiceOutputs { kick: 0.1, snare: 0.1, hihat: 0.1, bass: 0.1, chords: 0.1, preview: 0.0 }
    }

    #[test]
    fn silence_in_silence_out() {
        let mut g = graph();
        for _ in 0..1000 {
            assert!(g.process(&VoiceOutputs::default()).is_silent());
        }
        assert_eq!(g.read_master_meter(), f32::NEG_INFINITY);
    }

    #[test]
    fn solo_silences_other_tracks() {
        let mut g = graph();
        let mut settings = PerTrack::<TrackSettings>::default();
        settings.snare.solo = true;
        settings.kick.mute = false;
        g.apply_track_settings(&settings);
        for _ in 0..2000 {
            g.process(&all_on());
        }
        assert!(g.read_meter(Track::Snare).is_finite());
        for track in [Track::Kick, Track::Hihat, Track::Bass, Track::Chords] {
            assert_eq!(g.read_meter(track), f32::NEG_INFINITY, "{track}");
        }
    }

    #[test]
    fn mute_applies_without_solo() {
        let mut g = graph();
        let mut settings = PerTrack::<TrackSettings>::default();
        settings.hihat.mute = true;
        g.apply_track_settings(&settings);
        assert!(g.track_params(Track::Hihat).mute_effective);
        assert!(!g.track_params(Track::Kick).mute_effective);
    }

    #[test]
    fn resolution_is_recomputed_on_every_update() {
        let mut g = graph();
        let mut settings = PerTrack::<TrackSettings>::default();
        settings.kick.solo = true;
        g.apply_track_settings(&settings);
        assert!(g.track_params(Track::Snare).mute_effective);
        settings.kick.solo = false;
        g.apply_track_settings(&settings);
        assert!(!g.track_params(Track::Snare).mute_effective);
    }

    #[test]
    fn master_volume_scales_output() {
        let mut g = graph();
        let quiet = MasterSettings { volume_db: ry_ir::MIN_VOLUME_DB, ..MasterSettings::default() };
        g.set_master_params(&quiet);
        assert!(g.process(&all_on()).is_silent());
    }

    #[test]
    fn limiter_caps_master_peak() {
        let mut g = graph();
        let loud = VoiceOutputs { kick: 4.0, snare: 4.0, ..VoiceOutputs::default() };
        for _ in 0..1000 {
            assert!(g.process(&loud).peak() <= db_to_gain(-1.0) + 1e-6);
        }
    }
}
