//! Controller tests against the null audio backend.

use std::time::{Duration, Instant};

use ry_ir::{DrumSteps, DrumSynth, DrumSynthKind, EffectParam, MasterParam, Pattern, SequencerState, Track};
use ry_master::{
    cc, Backend, Controller, GenerationError, GenerationKind, Layout, LoadError, MeterLevels, MidiService,
    SampleSource, StepPosition, TransportListener,
};

const SR: u32 = 8000;

#[derive(Default)]
struct Recorder {
    steps: Vec<Option<StepPosition>>,
    meters: Vec<MeterLevels>,
}

impl TransportListener for Recorder {
    fn on_step_change(&mut self, position: Option<StepPosition>) {
        self.steps.push(position);
    }

    fn on_meter_update(&mut self, levels: &MeterLevels) {
        self.meters.push(*levels);
    }
}

fn controller() -> Controller {
    Controller::with_backend(MidiService::new(), Backend::Null { sample_rate: SR })
}

fn one_bar_layout() -> Layout {
    let sequencer_state = SequencerState { kick: DrumSteps::hits(&[0, 8]), ..SequencerState::default() };
    Layout {
        patterns: vec![Pattern { sequencer_state, ..Pattern::default() }],
        arrangement: vec![Some(0)],
        ..Layout::default()
    }
}

/// Poll until `done` holds or a few seconds pass.
fn poll_until(ctrl: &mut Controller, rec: &mut Recorder, done: impl Fn(&Recorder) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(rec) && Instant::now() < deadline {
        ctrl.poll(rec);
        std::thread::sleep(Duration::from_millis(2));
    }
}

// === Transport ===

#[test]
fn plays_one_pass_then_reports_stop() {
    let mut ctrl = controller();
    ctrl.update_all(one_bar_layout());
    ctrl.start().unwrap();
    assert_eq!(ctrl.sample_rate(), Some(SR));

    let mut rec = Recorder::default();
    // 16 meter ticks while playing, then the silent one from the halt.
    poll_until(&mut ctrl, &mut rec, |r| r.steps.contains(&None) && r.meters.len() >= 17);

    let played: Vec<StepPosition> = rec.steps.iter().flatten().copied().collect();
    assert_eq!(played.len(), 16);
    assert!(played.iter().enumerate().all(|(i, p)| p.step == i && p.bar == 0));
    assert_eq!(rec.steps.last(), Some(&None));
    assert!(rec.meters.last().unwrap().is_silent());
}

#[test]
fn stop_without_audio_still_reports_stop() {
    let mut ctrl = controller();
    ctrl.stop();
    let mut rec = Recorder::default();
    ctrl.poll(&mut rec);
    assert_eq!(rec.steps, vec![None]);
    assert_eq!(rec.meters.len(), 1);
    assert!(rec.meters[0].is_silent());
    assert!(!ctrl.is_audio_running());
}

#[test]
fn spectrum_needs_running_audio() {
    let mut ctrl = controller();
    assert!(ctrl.spectrum().is_none());
    ctrl.start().unwrap();
    assert_eq!(ctrl.spectrum().map(|s| s.len()), Some(ry_engine::SPECTRUM_BINS));
}

// === Samples ===

#[test]
fn unreadable_sample_is_reported_and_layout_kept() {
    let ctrl = controller();
    let before = ctrl.layout().clone();
    let source = SampleSource::File { path: "/nonexistent/snare.wav".into() };
    let result = ctrl.load_sample(ry_ir::DrumTrack::Snare, source).join().unwrap();
    assert!(matches!(result, Err(LoadError::Decode(_))));
    assert_eq!(ctrl.layout(), &before);
}

#[test]
fn update_all_reloads_only_changed_samples() {
    let mut ctrl = controller();
    assert!(ctrl.update_all(Layout::default()).is_empty());

    let mut layout = Layout::default();
    layout.sample_settings[ry_ir::DrumTrack::Hihat] =
        SampleSource::Synth { drum: DrumSynth::default_for(DrumSynthKind::Noise) };
    let loads = ctrl.update_all(layout);
    assert_eq!(loads.len(), 1);
    for load in loads {
        assert!(load.join().unwrap().is_ok());
    }
}

// === Live input ===

#[test]
fn midi_control_changes_reach_the_bass() {
    let mut ctrl = controller();
    let input = ctrl.midi().init();
    assert!(input.send_raw(&[0xB0, cc::VOLUME, 0]));
    assert!(input.send_raw(&[0xB0, cc::CUTOFF, 127]));
    ctrl.poll(&mut Recorder::default());

    assert_eq!(ctrl.track_settings()[Track::Bass].volume_db, -60.0);
    assert_eq!(ctrl.track_settings()[Track::Kick].volume_db, 0.0);
    assert!(ctrl.bass_synth().filter_envelope.base_frequency > 19_000.0);
}

#[test]
fn bpm_is_clamped_in_the_layout() {
    let mut ctrl = controller();
    ctrl.set_bpm(1.0);
    assert_eq!(ctrl.layout().bpm, ry_ir::MIN_BPM);
}

#[test]
fn single_field_updates_are_clamped() {
    let mut ctrl = controller();
    ctrl.set_master_param(MasterParam::CompressorRatio(100.0));
    ctrl.set_effect_param(EffectParam::DelayFeedback(2.0));
    assert_eq!(ctrl.layout().master_settings.compressor.ratio, 20.0);
    assert_eq!(ctrl.bass_effects().delay.settings.feedback, ry_ir::MAX_FEEDBACK);
}

// === Generation ===

#[test]
fn generated_drum_without_service_is_none() {
    let ctrl = controller();
    assert!(ctrl.generate_and_render_drum(DrumSynthKind::Metal, "crisp hat").join().unwrap().is_none());
}

#[test]
fn generated_drum_is_rendered_to_wav() {
    let drum = DrumSynth::default_for(DrumSynthKind::Membrane);
    let answer = serde_json::to_value(drum).unwrap();
    let ctrl = controller().with_generator(
        move |kind: GenerationKind, _: &str| -> Result<Option<serde_json::Value>, GenerationError> {
            assert_eq!(kind, GenerationKind::Drum(DrumSynthKind::Membrane));
            Ok(Some(answer.clone()))
        },
    );
    let preview = ctrl.generate_and_render_drum(DrumSynthKind::Membrane, "boomy").join().unwrap().unwrap();
    assert_eq!(preview.drum, drum);
    assert_eq!(&preview.wav[0..4], b"RIFF");
}
