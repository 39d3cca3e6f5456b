//! VoicePool: the five instruments and the sample bank they read from.

use ry_ir::{DrumTrack, PerDrum, SampleBuffer, SynthState};
use slotmap::SlotMap;

use crate::synth::{MonoSynth, PolySynth};
use crate::voice::SamplePlayer;

slotmap::new_key_type! {
    /// Handle to a buffer in the sample bank.
    pub struct SampleKey;
}

/// Mono output of every instrument for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VoiceOutputs {
    pub kick: f32,
    pub snare: f32,
    pub hihat: f32,
    pub bass: f32,
    pub chords: f32,
    pub preview: f32,
}

/// Owns every sound source of one engine instance.
pub struct VoicePool {
    /// Sample bank (owns all sample data).
    pub sample_bank: SlotMap<SampleKey, SampleBuffer>,
    pub drums: PerDrum<SamplePlayer>,
    /// Audition player outside the mix channels.
    pub preview: SamplePlayer,
    pub bass: MonoSynth,
    pub chords: PolySynth,
}

impl VoicePool {
    pub fn new(synth: &SynthState, sample_rate: f32) -> Self {
        Self {
            sample_bank: SlotMap::with_key(),
            drums: PerDrum::from_fn(|_| SamplePlayer::new(sample_rate)),
            preview: SamplePlayer::new(sample_rate),
            bass: MonoSynth::new(synth, sample_rate),
            chords: PolySynth::new(sample_rate),
        }
    }

    /// Swap in a fully decoded buffer for a drum track. The old buffer is
    /// dropped only after the player points at the new one.
    pub fn replace_sample(&mut self, drum: DrumTrack, buffer: SampleBuffer) -> SampleKey {
        let key = self.sample_bank.insert(buffer);
        let player = &mut self.drums[drum];
        let old = player.sample_key.replace(key);
        player.set_sample(key, &self.sample_bank[key]);
        if player.sample_key.is_none() {
            self.sample_bank.remove(key);
        }
        if let Some(old) = old {
            self.sample_bank.remove(old);
        }
        key
    }

    /// Start auditioning a buffer on the preview player.
    pub fn preview(&mut self, buffer: SampleBuffer) {
        let key = self.sample_bank.insert(buffer);
        if let Some(old) = self.preview.sample_key.replace(key) {
            self.sample_bank.remove(old);
        }
        self.preview.set_sample(key, &self.sample_bank[key]);
        if self.preview.sample_key.is_none() {
            self.sample_bank.remove(key);
        }
        self.preview.trigger(1.0);
    }

    pub fn has_sample(&self, drum: DrumTrack) -> bool {
        self.drums[drum].sample_key.is_some_and(|k| self.sample_bank.contains_key(k))
    }

    pub fn trigger_drum(&mut self, drum: DrumTrack, velocity: f32) {
        self.drums[drum].trigger(velocity);
    }

    /// Silence every instrument.
    pub fn stop_all(&mut self) {
        for drum in DrumTrack::ALL {
            self.drums[drum].stop();
        }
        self.preview.stop();
        self.bass.reset();
        self.chords.reset();
    }

    /// Render one frame of every instrument (split-borrow safe).
    #[inline]
    pub fn render(&mut self) -> VoiceOutputs {
        let bank = &self.sample_bank;
        let render_player = |player: &mut SamplePlayer| match player.sample_key.and_then(|k| bank.get(k)) {
            Some(buffer) => player.render_with_source(buffer),
            None => {
                player.playing = false;
                0.0
            }
        };
        VoiceOutputs {
            kick: render_player(&mut self.drums.kick),
            snare: render_player(&mut self.drums.snare),
            hihat: render_player(&mut self.drums.hihat),
            preview: render_player(&mut self.preview),
            bass: self.bass.render(),
            chords: self.chords.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> VoicePool {
        VoicePool::new(&SynthState::default(), 44100.0)
    }

    #[test]
    fn new_pool_is_silent() {
        let mut pool = pool();
        assert_eq!(pool.render(), VoiceOutputs::default());
    }

    #[test]
    fn replace_sample_frees_old_buffer() {
        let mut pool = pool();
        pool.replace_sample(DrumTrack::Kick, SampleBuffer::new(vec![1.0; 8], 44100));
        pool.replace_sample(DrumTrack::Kick, SampleBuffer::new(vec![0.5; 8], 44100));
        assert_eq!(pool.sample_bank.len(), 1);
        assert!(pool.has_sample(DrumTrack::Kick));
        assert!(!pool.has_sample(DrumTrack::Snare));
    }

    #[test]
    fn replacing_one_drum_leaves_others_playing() {
        let mut pool = pool();
        pool.replace_sample(DrumTrack::Kick, SampleBuffer::new(vec![1.0; 8], 44100));
        pool.replace_sample(DrumTrack::Snare, SampleBuffer::new(vec![0.5; 8], 44100));
        pool.trigger_drum(DrumTrack::Kick, 1.0);
        pool.trigger_drum(DrumTrack::Snare, 1.0);
        pool.render();
        pool.replace_sample(DrumTrack::Snare, SampleBuffer::new(vec![0.25; 8], 44100));
        let out = pool.render();
        assert_eq!(out.kick, 1.0);
        assert_eq!(out.snare, 0.0);
    }

    #[test]
    fn triggered_drum_sounds() {
        let mut pool = pool();
        pool.replace_sample(DrumTrack::Hihat, SampleBuffer::new(vec![0.75; 8], 44100));
        pool.trigger_drum(DrumTrack::Hihat, 1.0);
        assert_eq!(pool.render().hihat, 0.75);
    }

    #[test]
    fn preview_plays_once() {
        let mut pool = pool();
        pool.preview(SampleBuffer::new(vec![0.5, 0.5], 44100));
        assert_eq!(pool.render().preview, 0.5);
        pool.render();
        assert_eq!(pool.render().preview, 0.0);
    }
}
