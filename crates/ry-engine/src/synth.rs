//! Bass and chord synthesizers.

use ry_ir::{midi_to_frequency, Adsr, OscillatorType, Pitch, SynthState};

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::Filter;
use crate::dsp::oscillator::Oscillator;

/// Samples between filter coefficient updates.
const FILTER_UPDATE_INTERVAL: u32 = 32;

/// Voices in the chord synth.
pub const POLY_VOICES: usize = 8;

/// Chord voice settings.
pub const CHORD_OSCILLATOR: OscillatorType = OscillatorType::Triangle;
pub const CHORD_ENVELOPE: Adsr = Adsr::new(0.005, 0.1, 0.3, 1.0);

// === Mono synth ===

/// Monophonic subtractive synth: oscillator, amp envelope and an
/// envelope-swept filter.
#[derive(Clone, Debug)]
pub struct MonoSynth {
    state: SynthState,
    osc: Oscillator,
    amp_env: Envelope,
    filter_env: Envelope,
    filter: Filter,
    note: Option<u8>,
    velocity: f32,
    /// Frames until an automatic release.
    gate_remaining: Option<u64>,
    update_counter: u32,
}

impl MonoSynth {
    pub fn new(state: &SynthState, sample_rate: f32) -> Self {
        let mut synth = Self {
            state: *state,
            osc: Oscillator::new(state.oscillator, sample_rate),
            amp_env: Envelope::new(state.envelope, sample_rate),
            filter_env: Envelope::new(state.filter_envelope.adsr(), sample_rate),
            filter: Filter::new(state.filter.kind, state.filter.q, state.filter.rolloff, sample_rate),
            note: None,
            velocity: 1.0,
            gate_remaining: None,
            update_counter: 0,
        };
        synth.update_cutoff();
        synth
    }

    pub fn state(&self) -> &SynthState {
        &self.state
    }

    /// Apply a new configuration. Sounding notes keep playing.
    pub fn set_state(&mut self, state: &SynthState) {
        if self.state == *state {
            return;
        }
        self.state = *state;
        self.osc.kind = state.oscillator;
        self.amp_env.set_adsr(state.envelope);
        self.filter_env.set_adsr(state.filter_envelope.adsr());
        self.filter.configure(state.filter.kind, state.filter.q, state.filter.rolloff);
        self.update_cutoff();
    }

    /// Currently held or releasing note.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn is_active(&self) -> bool {
        !self.amp_env.is_idle()
    }

    pub fn trigger_attack(&mut self, note: u8, velocity: f32) {
        self.note = Some(note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.osc.set_frequency(midi_to_frequency(note));
        self.amp_env.gate_on();
        self.filter_env.gate_on();
        self.gate_remaining = None;
    }

    pub fn trigger_release(&mut self) {
        self.amp_env.gate_off();
        self.filter_env.gate_off();
        self.gate_remaining = None;
    }

    pub fn trigger_attack_release(&mut self, pitch: Pitch, duration_frames: u64, velocity: f32) {
        self.trigger_attack(pitch.midi(), velocity);
        self.gate_remaining = Some(duration_frames.max(1));
    }

    /// Release only if `note` is the one sounding.
    pub fn note_off(&mut self, note: u8) {
        if self.note == Some(note) {
            self.trigger_release();
        }
    }

    /// Silence immediately.
    pub fn reset(&mut self) {
        self.amp_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.osc.reset();
        self.note = None;
        self.gate_remaining = None;
    }

    fn update_cutoff(&mut self) {
        let fe = &self.state.filter_envelope;
        let cutoff = fe.base_frequency * 2f32.powf(self.filter_env.value() * fe.octaves);
        self.filter.set_cutoff(cutoff);
    }

    #[inline]
    pub fn render(&mut self) -> f32 {
        if let Some(remaining) = self.gate_remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.trigger_release();
            }
        }
        if self.amp_env.is_idle() {
            return 0.0;
        }
        self.filter_env.next_value();
        self.update_counter += 1;
        if self.update_counter >= FILTER_UPDATE_INTERVAL {
            self.update_counter = 0;
            self.update_cutoff();
        }
        let amp = self.amp_env.next_value();
        self.filter.process(self.osc.next_sample()) * amp * self.velocity
    }
}

// === Poly synth ===

#[derive(Clone, Debug)]
struct PolyVoice {
    osc: Oscillator,
    env: Envelope,
    note: u8,
    velocity: f32,
    gate_remaining: Option<u64>,
    /// Allocation order for stealing.
    started: u64,
}

impl PolyVoice {
    fn released(&self) -> bool {
        self.gate_remaining.is_none()
    }
}

/// Fixed-size polyphonic synth for chords.
#[derive(Clone, Debug)]
pub struct PolySynth {
    voices: Vec<PolyVoice>,
    counter: u64,
}

impl PolySynth {
    pub fn new(sample_rate: f32) -> Self {
        let voices = (0..POLY_VOICES)
            .map(|_| PolyVoice {
                osc: Oscillator::new(CHORD_OSCILLATOR, sample_rate),
                env: Envelope::new(CHORD_ENVELOPE, sample_rate),
                note: 0,
                velocity: 0.0,
                gate_remaining: None,
                started: 0,
            })
            .collect();
        Self { voices, counter: 0 }
    }

    /// Number of voices still producing sound.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.env.is_idle()).count()
    }

    fn allocate(&mut self) -> usize {
        // Idle first, then the oldest released voice, then the oldest overall.
        if let Some(i) = self.voices.iter().position(|v| v.env.is_idle()) {
            return i;
        }
        let oldest = |released_only: bool| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| !released_only || v.released())
                .min_by_key(|(_, v)| v.started)
                .map(|(i, _)| i)
        };
        oldest(true).or_else(|| oldest(false)).unwrap_or(0)
    }

    pub fn trigger_attack_release(&mut self, notes: &[Pitch], duration_frames: u64, velocity: f32) {
        for pitch in notes {
            let i = self.allocate();
            self.counter += 1;
            let voice = &mut self.voices[i];
            voice.note = pitch.midi();
            voice.velocity = velocity.clamp(0.0, 1.0);
            voice.osc.reset();
            voice.osc.set_frequency(pitch.frequency());
            voice.env.reset();
            voice.env.gate_on();
            voice.gate_remaining = Some(duration_frames.max(1));
            voice.started = self.counter;
        }
    }

    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.env.gate_off();
            voice.gate_remaining = None;
        }
    }

    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.env.reset();
            voice.gate_remaining = None;
        }
    }

    #[inline]
    pub fn render(&mut self) -> f32 {
        let mut sum = 0.0;
        for voice in &mut self.voices {
            if let Some(remaining) = voice.gate_remaining.as_mut() {
                *remaining -= 1;
                if *remaining == 0 {
                    voice.gate_remaining = None;
                    voice.env.gate_off();
                }
            }
            if voice.env.is_idle() {
                continue;
            }
            sum += voice.osc.next_sample() * voice.env.next_value() * voice.velocity;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::Stage;
    use ry_ir::Chord;

    const SR: f32 = 44100.0;

    fn run_mono(synth: &mut MonoSynth, frames: usize) -> f32 {
        (0..frames).map(|_| synth.render().abs()).fold(0.0, f32::max)
    }

    // === MonoSynth ===

    #[test]
    fn idle_synth_is_silent() {
        let mut synth = MonoSynth::new(&SynthState::default(), SR);
        assert_eq!(run_mono(&mut synth, 512), 0.0);
    }

    #[test]
    fn attack_release_sounds_then_decays() {
        let mut synth = MonoSynth::new(&SynthState::default(), SR);
        synth.trigger_attack_release(Pitch(36), 2000, 0.9);
        assert!(run_mono(&mut synth, 2000) > 0.01);
        // Default release is one second.
        run_mono(&mut synth, 3 * SR as usize);
        assert!(!synth.is_active());
        assert_eq!(synth.render(), 0.0);
    }

    #[test]
    fn note_off_only_releases_current_note() {
        let mut synth = MonoSynth::new(&SynthState::default(), SR);
        synth.trigger_attack(40, 1.0);
        synth.note_off(41);
        run_mono(&mut synth, 100);
        assert_ne!(synth.amp_env.stage(), Stage::Release);
        synth.note_off(40);
        assert_eq!(synth.amp_env.stage(), Stage::Release);
    }

    #[test]
    fn reset_silences_immediately() {
        let mut synth = MonoSynth::new(&SynthState::default(), SR);
        synth.trigger_attack(40, 1.0);
        run_mono(&mut synth, 100);
        synth.reset();
        assert_eq!(synth.render(), 0.0);
        assert_eq!(synth.note(), None);
    }

    // === PolySynth ===

    #[test]
    fn chord_uses_one_voice_per_note() {
        let mut poly = PolySynth::new(SR);
        let chord: Chord = "Cmaj7".parse().unwrap();
        poly.trigger_attack_release(&chord.notes(), 1000, 0.6);
        assert_eq!(poly.active_voices(), 4);
    }

    #[test]
    fn voices_are_stolen_when_full() {
        let mut poly = PolySynth::new(SR);
        let chord: Chord = "Cmaj7".parse().unwrap();
        for _ in 0..3 {
            poly.trigger_attack_release(&chord.notes(), 100_000, 0.6);
        }
        assert_eq!(poly.active_voices(), POLY_VOICES);
    }

    #[test]
    fn chord_release_returns_to_silence() {
        let mut poly = PolySynth::new(SR);
        let chord: Chord = "Am".parse().unwrap();
        poly.trigger_attack_release(&chord.notes(), 100, 0.6);
        for _ in 0..(3.0 * SR) as usize {
            poly.render();
        }
        assert_eq!(poly.active_voices(), 0);
        assert_eq!(poly.render(), 0.0);
    }
}
