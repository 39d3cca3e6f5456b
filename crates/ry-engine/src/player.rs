//! Player: transport, scheduler and engine on one sample clock.
//!
//! Each rendered frame first runs any due bar tick, then the meter tick,
//! then dispatches the events scheduled at or before the current frame and
//! finally renders audio. Live playback and offline rendering both drive
//! a `Player`; they differ only in [`ResyncPolicy`].

use ry_ir::{bar_seconds, clamp_bpm, step_seconds, Layout, Track, STEPS_PER_BAR};

use crate::event::{Event, EventPayload, EventTarget};
use crate::event_queue::EventQueue;
use crate::frame::Frame;
use crate::mixer::Engine;
use crate::scheduler::{expand_pattern, seconds_to_frames};
use crate::transport::{MeterLevels, ResyncPolicy, StepPosition, Transport, UiEvent};

pub struct Player {
    engine: Engine,
    transport: Transport,
    queue: EventQueue,
    layout: Layout,
    /// Frames rendered so far.
    clock: u64,
    outbox: Vec<UiEvent>,
}

impl Player {
    pub fn new(layout: Layout, sample_rate: u32, policy: ResyncPolicy) -> Self {
        let mut engine = Engine::new(sample_rate);
        engine.set_master_params(&layout.master_settings);
        Self {
            engine,
            transport: Transport::new(policy),
            queue: EventQueue::new(),
            layout,
            clock: 0,
            outbox: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn position(&self) -> Option<StepPosition> {
        self.transport.position
    }

    /// Pattern whose settings are applied to the graph.
    pub fn active_pattern(&self) -> Option<usize> {
        self.transport.active_pattern
    }

    /// Settings re-syncs performed since creation.
    pub fn resync_count(&self) -> usize {
        self.transport.resyncs
    }

    /// Begin a single pass through the arrangement. No-op while playing.
    pub fn start(&mut self) {
        if self.transport.is_playing() {
            return;
        }
        let bars = self.layout.arrangement.len();
        log::info!(target: "transport", "start: {bars} bars at {} bpm", self.layout.bpm);
        self.transport.start(bars, self.clock);
        if self.transport.finished() {
            self.stop();
        }
    }

    /// Halt, drop pending events and report the stopped state.
    pub fn stop(&mut self) {
        if self.transport.is_playing() {
            log::info!(target: "transport", "stop at bar {}", self.transport.bar);
        }
        self.transport.stop();
        self.queue.clear();
        self.engine.release_all();
        self.engine.reset_meters();
        self.outbox.push(UiEvent::StepChanged(None));
        self.outbox.push(UiEvent::Meters(MeterLevels::silent()));
    }

    /// Replace the layout. Master settings apply immediately; bpm from the next bar.
    pub fn update_layout(&mut self, layout: Layout) {
        self.engine.set_master_params(&layout.master_settings);
        self.layout = layout;
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.layout.bpm = clamp_bpm(bpm);
    }

    /// UI events produced since the last drain.
    pub fn drain_ui_events(&mut self) -> std::vec::Drain<'_, UiEvent> {
        self.outbox.drain(..)
    }

    fn step_frames(&self) -> f64 {
        step_seconds(self.layout.bpm) * self.sample_rate() as f64
    }

    fn bar_tick(&mut self) {
        if self.transport.finished() {
            log::debug!(target: "transport", "arrangement finished");
            self.stop();
            return;
        }
        let bar = self.transport.bar;
        let sample_rate = self.sample_rate();
        let bar_start = self.transport.next_bar_at / sample_rate as f64;

        match self.layout.pattern_at(bar) {
            None => {
                // Keep a held bass note from ringing into the gap.
                self.engine.release_bass();
            }
            Some((index, pattern)) => {
                if self.transport.needs_resync(index) {
                    log::debug!(target: "transport", "bar {bar}: applying pattern {index} settings");
                    self.engine.apply_pattern(pattern);
                    self.transport.active_pattern = Some(index);
                    self.transport.resyncs += 1;
                }
                let step_secs = step_seconds(self.layout.bpm);
                for step_event in expand_pattern(pattern, step_secs) {
                    self.queue.push(step_event.to_event(bar_start, sample_rate));
                }
                for step in 0..STEPS_PER_BAR {
                    let time = seconds_to_frames(bar_start + step as f64 * step_secs, sample_rate);
                    let position = StepPosition { step, bar };
                    self.queue.push(Event::new(time, EventTarget::Ui, EventPayload::StepChange(position)));
                }
            }
        }

        self.queue.compact();
        self.transport.bar += 1;
        self.transport.next_bar_at += bar_seconds(self.layout.bpm) * sample_rate as f64;
    }

    fn dispatch_due(&mut self) {
        let range = self.queue.drain_until(self.clock);
        for i in range {
            let Some(event) = self.queue.get(i) else { continue };
            match (&event.target, &event.payload) {
                (EventTarget::Ui, EventPayload::StepChange(position)) => {
                    self.transport.position = Some(*position);
                    self.outbox.push(UiEvent::StepChanged(Some(*position)));
                }
                (EventTarget::Instrument(_), _) => self.engine.dispatch(event),
                _ => {}
            }
        }
    }

    /// Generate one frame, advancing the clock.
    pub fn render_frame(&mut self) -> Frame {
        let now = self.clock as f64;
        while self.transport.is_playing() && now >= self.transport.next_bar_at {
            self.bar_tick();
        }
        if self.transport.is_playing() && now >= self.transport.next_meter_at {
            self.outbox.push(UiEvent::Meters(self.engine.meter_levels()));
            let period = self.step_frames();
            self.transport.next_meter_at += period;
        }
        self.dispatch_due();
        let frame = self.engine.render_frame();
        self.clock += 1;
        frame
    }

    pub fn render_block(&mut self, out: &mut [Frame]) {
        for frame in out.iter_mut() {
            *frame = self.render_frame();
        }
    }

    /// Live note input for the bass synth.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.engine.note_on(note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        self.engine.note_off(note);
    }

    /// Meter level of a track (convenience for callers holding only the player).
    pub fn read_meter(&self, track: Track) -> f32 {
        self.engine.read_meter(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ry_ir::{DrumSteps, DrumTrack, Pattern, SampleBuffer, SequencerState};

    const SR: u32 = 8000;

    fn kick_pattern() -> Pattern {
        let sequencer_state = SequencerState { kick: DrumSteps::hits(&[0]), ..SequencerState::default() };
        Pattern { sequencer_state, ..Pattern::default() }
    }

    fn layout(arrangement: Vec<Option<usize>>) -> Layout {
        Layout { patterns: vec![kick_pattern(), Pattern::default()], arrangement, ..Layout::default() }
    }

    fn player(arrangement: Vec<Option<usize>>, policy: ResyncPolicy) -> Player {
        let mut p = Player::new(layout(arrangement), SR, policy);
        p.engine_mut().replace_sample(DrumTrack::Kick, SampleBuffer::new(vec![0.5; 100], SR));
        p
    }

    fn bar_frames(p: &Player) -> usize {
        (p.layout().bar_seconds() * SR as f64).round() as usize
    }

    fn run(p: &mut Player, frames: usize) -> Vec<Frame> {
        (0..frames).map(|_| p.render_frame()).collect()
    }

    #[test]
    fn stopped_player_schedules_nothing() {
        let mut p = player(vec![Some(0)], ResyncPolicy::OnPatternChange);
        assert!(run(&mut p, 1000).iter().all(|f| f.is_silent()));
        assert_eq!(p.drain_ui_events().count(), 0);
    }

    #[test]
    fn first_frame_of_bar_plays_kick() {
        let mut p = player(vec![Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let out = run(&mut p, 10);
        assert!(!out[0].is_silent());
    }

    #[test]
    fn halts_after_one_pass() {
        let mut p = player(vec![Some(0), Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, 2 * frames);
        assert!(p.is_playing());
        run(&mut p, 1);
        assert!(!p.is_playing());
        let events: Vec<UiEvent> = p.drain_ui_events().collect();
        assert_eq!(events[events.len() - 2], UiEvent::StepChanged(None));
        assert_eq!(events[events.len() - 1], UiEvent::Meters(MeterLevels::silent()));
    }

    #[test]
    fn empty_arrangement_halts_immediately() {
        let mut p = player(vec![], ResyncPolicy::OnPatternChange);
        p.start();
        assert!(!p.is_playing());
        let events: Vec<UiEvent> = p.drain_ui_events().collect();
        assert_eq!(events, vec![UiEvent::StepChanged(None), UiEvent::Meters(MeterLevels::silent())]);
    }

    #[test]
    fn step_changes_cover_every_step() {
        let mut p = player(vec![Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, frames);
        let steps: Vec<StepPosition> = p
            .drain_ui_events()
            .filter_map(|e| match e {
                UiEvent::StepChanged(Some(pos)) => Some(pos),
                _ => None,
            })
            .collect();
        assert_eq!(steps.len(), STEPS_PER_BAR);
        assert_eq!(steps[0], StepPosition { step: 0, bar: 0 });
        assert_eq!(steps[15], StepPosition { step: 15, bar: 0 });
    }

    #[test]
    fn meter_ticks_every_step() {
        let mut p = player(vec![Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, frames);
        let meters = p.drain_ui_events().filter(|e| matches!(e, UiEvent::Meters(_))).count();
        assert_eq!(meters, STEPS_PER_BAR);
    }

    #[test]
    fn resync_once_per_pattern_switch() {
        let mut p = player(vec![Some(0), Some(0), Some(1), Some(1), Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, 5 * frames);
        assert_eq!(p.resync_count(), 3);
    }

    #[test]
    fn offline_policy_resyncs_every_non_empty_bar() {
        let mut p = player(vec![Some(0), None, Some(0)], ResyncPolicy::EveryBar);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, 3 * frames);
        assert_eq!(p.resync_count(), 2);
    }

    #[test]
    fn empty_bar_is_silent() {
        let mut p = player(vec![Some(0), None, Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        let out = run(&mut p, 3 * frames);
        assert!(out[frames..2 * frames].iter().all(|f| f.is_silent()));
        assert!(out[2 * frames..].iter().any(|f| !f.is_silent()));
    }

    #[test]
    fn stop_clears_pending_events() {
        let mut p = player(vec![Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        run(&mut p, 10);
        p.stop();
        assert_eq!(p.position(), None);
        p.drain_ui_events().count();
        let frames = bar_frames(&p);
        run(&mut p, frames);
        assert_eq!(p.drain_ui_events().count(), 0);
    }

    #[test]
    fn bpm_change_applies_from_next_bar() {
        let mut p = player(vec![Some(0), Some(0), Some(0)], ResyncPolicy::OnPatternChange);
        p.start();
        let frames = bar_frames(&p);
        run(&mut p, 1);
        p.set_bpm(240.0);
        run(&mut p, frames - 1);
        // Bar 1 starts on schedule; bars now last half as long.
        run(&mut p, frames / 2 + frames / 2 + 1);
        assert!(!p.is_playing());
    }
}
