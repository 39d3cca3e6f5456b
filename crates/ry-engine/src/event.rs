//! Events scheduled on the engine's sample clock.

use arrayvec::ArrayVec;
use ry_ir::{Pitch, Track, MAX_CHORD_NOTES};

use crate::transport::StepPosition;

/// Absolute time in frames since the player was created.
pub type FrameTime = u64;

/// What an event is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    Instrument(Track),
    /// Delivered to the UI outbox instead of the audio graph.
    Ui,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    /// Start a drum sample.
    Trigger { velocity: f32 },
    /// Play notes for a fixed number of frames, then release.
    AttackRelease { notes: ArrayVec<Pitch, MAX_CHORD_NOTES>, duration_frames: u64, velocity: f32 },
    /// Release whatever the instrument is holding.
    Release,
    /// Playhead moved.
    StepChange(StepPosition),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub time: FrameTime,
    pub target: EventTarget,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(time: FrameTime, target: EventTarget, payload: EventPayload) -> Self {
        Self { time, target, payload }
    }
}
