//! Pattern step expansion.
//!
//! Turns one pattern into the list of instrument actions for its bar. The
//! live player and the offline renderer both schedule from this function.

use arrayvec::ArrayVec;
use ry_ir::{Pattern, Pitch, Track, MAX_CHORD_NOTES, STEPS_PER_BAR};

use crate::event::{Event, EventPayload, EventTarget, FrameTime};

pub const DRUM_VELOCITY: f32 = 1.0;
pub const BASS_VELOCITY: f32 = 0.9;
pub const CHORD_VELOCITY: f32 = 0.6;

/// A chord sounds for a quarter note.
pub const CHORD_STEPS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub enum StepAction {
    Trigger { velocity: f32 },
    AttackRelease { notes: ArrayVec<Pitch, MAX_CHORD_NOTES>, duration: f64, velocity: f32 },
}

/// One instrument action within a bar.
#[derive(Clone, Debug, PartialEq)]
pub struct StepEvent {
    pub step: usize,
    /// Seconds after the start of the bar.
    pub offset: f64,
    pub track: Track,
    pub action: StepAction,
}

/// Expand every step of `pattern` into instrument actions, ordered by step
/// then track.
pub fn expand_pattern(pattern: &Pattern, step_seconds: f64) -> Vec<StepEvent> {
    let seq = &pattern.sequencer_state;
    let mut events = Vec::new();

    for step in 0..STEPS_PER_BAR {
        let offset = step as f64 * step_seconds;
        let mut push = |track, action| events.push(StepEvent { step, offset, track, action });

        for (track, steps) in [(Track::Kick, &seq.kick), (Track::Snare, &seq.snare), (Track::Hihat, &seq.hihat)] {
            if steps.steps[step] {
                push(track, StepAction::Trigger { velocity: DRUM_VELOCITY });
            }
        }
        if let Some(pitch) = seq.bass.steps[step] {
            let mut notes = ArrayVec::new();
            notes.push(pitch);
            push(Track::Bass, StepAction::AttackRelease { notes, duration: step_seconds, velocity: BASS_VELOCITY });
        }
        if let Some(chord) = seq.chords.steps[step] {
            push(
                Track::Chords,
                StepAction::AttackRelease {
                    notes: chord.notes(),
                    duration: step_seconds * CHORD_STEPS as f64,
                    velocity: CHORD_VELOCITY,
                },
            );
        }
    }

    events
}

/// Seconds to frames on the sample clock.
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    (seconds * sample_rate as f64).round().max(0.0) as u64
}

impl StepEvent {
    /// Place this action on the sample clock for a bar starting at `bar_start` seconds.
    pub fn to_event(&self, bar_start: f64, sample_rate: u32) -> Event {
        let time: FrameTime = seconds_to_frames(bar_start + self.offset, sample_rate);
        let payload = match &self.action {
            StepAction::Trigger { velocity } => EventPayload::Trigger { velocity: *velocity },
            StepAction::AttackRelease { notes, duration, velocity } => EventPayload::AttackRelease {
                notes: notes.clone(),
                duration_frames: seconds_to_frames(*duration, sample_rate).max(1),
                velocity: *velocity,
            },
        };
        Event::new(time, EventTarget::Instrument(self.track), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ry_ir::{step_seconds, Chord, DrumSteps, SequencerState};

    fn pattern_with(seq: SequencerState) -> Pattern {
        Pattern { sequencer_state: seq, ..Pattern::default() }
    }

    #[test]
    fn empty_pattern_produces_no_events() {
        assert!(expand_pattern(&Pattern::default(), 0.125).is_empty());
    }

    #[test]
    fn drum_hits_are_offset_by_step() {
        let seq = SequencerState { snare: DrumSteps::hits(&[4, 12]), ..SequencerState::default() };
        let events = expand_pattern(&pattern_with(seq), 0.125);
        let offsets: Vec<f64> = events.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0.5, 1.5]);
        assert!(events.iter().all(|e| e.track == Track::Snare));
        assert_eq!(events[0].action, StepAction::Trigger { velocity: DRUM_VELOCITY });
    }

    #[test]
    fn bass_lasts_one_step_chords_a_quarter() {
        let mut seq = SequencerState::default();
        seq.bass.steps[2] = Some("C2".parse().unwrap());
        seq.chords.steps[8] = Some("Am".parse::<Chord>().unwrap());
        let events = expand_pattern(&pattern_with(seq), 0.125);
        assert_eq!(events.len(), 2);
        match &events[0].action {
            StepAction::AttackRelease { notes, duration, velocity } => {
                assert_eq!(notes.as_slice(), &[Pitch(36)]);
                assert_eq!(*duration, 0.125);
                assert_eq!(*velocity, BASS_VELOCITY);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &events[1].action {
            StepAction::AttackRelease { notes, duration, .. } => {
                assert_eq!(notes.len(), 3);
                assert_eq!(*duration, 0.5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn starter_pattern_orders_by_step() {
        let events = expand_pattern(&Pattern::starter(), step_seconds(120.0));
        assert!(events.windows(2).all(|w| w[0].step <= w[1].step));
        assert_eq!(events.iter().filter(|e| e.track == Track::Kick).count(), 4);
    }

    #[test]
    fn events_land_on_sample_clock() {
        let seq = SequencerState { kick: DrumSteps::hits(&[1]), ..SequencerState::default() };
        let events = expand_pattern(&pattern_with(seq), 0.125);
        let event = events[0].to_event(2.0, 44100);
        assert_eq!(event.time, 88200 + 5513);
        assert_eq!(event.target, EventTarget::Instrument(Track::Kick));
    }
}
