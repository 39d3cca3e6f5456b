//! Transport state and the events it reports to the UI.

use ry_ir::{PerTrack, Track};

/// Playhead position: step within the bar and bar within the arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPosition {
    pub step: usize,
    pub bar: usize,
}

/// Level of every channel and the master bus in dB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterLevels {
    pub tracks: PerTrack<f32>,
    pub master: f32,
}

impl MeterLevels {
    /// All meters at `-inf`.
    pub fn silent() -> Self {
        Self { tracks: PerTrack::from_fn(|_| f32::NEG_INFINITY), master: f32::NEG_INFINITY }
    }

    pub fn track(&self, track: Track) -> f32 {
        self.tracks[track]
    }

    pub fn is_silent(&self) -> bool {
        self.master == f32::NEG_INFINITY && self.tracks.iter().all(|(_, db)| *db == f32::NEG_INFINITY)
    }
}

/// Event produced for the UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiEvent {
    /// `None` marks the stopped transport.
    StepChanged(Option<StepPosition>),
    Meters(MeterLevels),
}

/// Receiver of transport feedback.
pub trait TransportListener {
    fn on_step_change(&mut self, position: Option<StepPosition>);
    fn on_meter_update(&mut self, levels: &MeterLevels);
}

impl UiEvent {
    pub fn deliver(&self, listener: &mut impl TransportListener) {
        match self {
            UiEvent::StepChanged(position) => listener.on_step_change(*position),
            UiEvent::Meters(levels) => listener.on_meter_update(levels),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

/// When a bar re-applies its pattern's mixer, effects and synth settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResyncPolicy {
    /// Only when the active pattern changes (live playback).
    OnPatternChange,
    /// At every non-empty bar (offline render).
    EveryBar,
}

/// Bar and meter clocks of the transport, in frames.
#[derive(Clone, Debug)]
pub struct Transport {
    pub state: TransportState,
    pub policy: ResyncPolicy,
    /// Bars to play before halting.
    pub iterations: usize,
    /// Next bar index to tick.
    pub bar: usize,
    /// Frame time of the next bar tick.
    pub next_bar_at: f64,
    /// Frame time of the next meter tick.
    pub next_meter_at: f64,
    /// Pattern whose settings are currently applied.
    pub active_pattern: Option<usize>,
    /// Number of settings re-syncs performed.
    pub resyncs: usize,
    pub position: Option<StepPosition>,
}

impl Transport {
    pub fn new(policy: ResyncPolicy) -> Self {
        Self {
            state: TransportState::Stopped,
            policy,
            iterations: 0,
            bar: 0,
            next_bar_at: 0.0,
            next_meter_at: 0.0,
            active_pattern: None,
            resyncs: 0,
            position: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn start(&mut self, iterations: usize, now: u64) {
        self.state = TransportState::Playing;
        self.iterations = iterations;
        self.bar = 0;
        self.next_bar_at = now as f64;
        self.next_meter_at = now as f64;
        self.active_pattern = None;
        self.position = None;
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.active_pattern = None;
        self.position = None;
    }

    /// True once every bar of the pass has been ticked.
    pub fn finished(&self) -> bool {
        self.bar >= self.iterations
    }

    /// Whether a bar playing `pattern` must re-apply its settings.
    pub fn needs_resync(&self, pattern: usize) -> bool {
        match self.policy {
            ResyncPolicy::OnPatternChange => self.active_pattern != Some(pattern),
            ResyncPolicy::EveryBar => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_resyncs_only_on_change() {
        let mut t = Transport::new(ResyncPolicy::OnPatternChange);
        t.start(4, 0);
        assert!(t.needs_resync(0));
        t.active_pattern = Some(0);
        assert!(!t.needs_resync(0));
        assert!(t.needs_resync(1));
    }

    #[test]
    fn offline_resyncs_every_bar() {
        let mut t = Transport::new(ResyncPolicy::EveryBar);
        t.start(4, 0);
        t.active_pattern = Some(0);
        assert!(t.needs_resync(0));
    }

    #[test]
    fn empty_pass_is_finished_at_start() {
        let mut t = Transport::new(ResyncPolicy::OnPatternChange);
        t.start(0, 100);
        assert!(t.finished());
        assert_eq!(t.next_bar_at, 100.0);
    }

    #[test]
    fn silent_levels() {
        let levels = MeterLevels::silent();
        assert!(levels.is_silent());
        assert_eq!(levels.track(Track::Bass), f32::NEG_INFINITY);
    }
}
