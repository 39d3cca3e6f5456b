//! Headless controller for the rythmai sequencer.
//!
//! Owns the layout being edited, runs live playback on an audio thread and
//! exposes the operations an editing surface needs. Offline rendering and
//! drum synthesis are available as free functions as well.

mod assist;
mod command;
mod drum;
mod error;
mod loader;
mod midi;
mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ry_audio::AudioOutput;
use ry_engine::{Frame, Player, ResyncPolicy};
use ry_ir::{
    clamp_bpm, DrumSynthKind, DrumTrack, EffectParam, EffectsState, MasterParam, MasterSettings, PerTrack,
    SynthParam, Track, TrackParam, TrackSettings,
};

// Re-export common types so callers don't need ry-ir/ry-engine directly.
pub use assist::{
    generate_drum, regenerate_chords, suggest_chords, suggest_drum, suggest_effects, suggest_synth, DrumPreview,
    GenerationKind, NoGenerator, ParamGenerator,
};
pub use command::Command;
pub use drum::render_drum_sample;
pub use error::{GenerationError, LoadError, RenderError};
pub use loader::{load_source, spawn_load};
pub use midi::{MidiEvent, MidiInput, MidiService};
pub use render::{export_wav, render, write_export, EXPORT_FILE_NAME};
pub use ry_audio::{AudioError, Backend};
pub use ry_engine::{MeterLevels, StepPosition, TransportListener, UiEvent, PROJECT_SAMPLE_RATE};
pub use ry_ir::{Layout, SampleSource, SynthState};

/// Frames rendered per write to the output.
const BLOCK_FRAMES: usize = 256;
/// How long a non-realtime output waits for commands while idle.
const IDLE_WAIT: Duration = Duration::from_millis(5);
const SPECTRUM_TIMEOUT: Duration = Duration::from_millis(250);

/// MIDI controllers mapped onto the bass track and synth.
pub mod cc {
    pub const VOLUME: u8 = 7;
    pub const PAN: u8 = 10;
    pub const RESONANCE: u8 = 71;
    pub const RELEASE: u8 = 72;
    pub const ATTACK: u8 = 73;
    pub const CUTOFF: u8 = 74;
}

/// Headless sequencer controller: owns a layout and manages playback.
pub struct Controller {
    layout: Layout,
    backend: Backend,
    midi: MidiService,
    generator: Arc<dyn ParamGenerator>,
    commands: Sender<Command>,
    /// Kept so queued commands survive until an audio thread picks them up.
    command_rx: Receiver<Command>,
    events_tx: Sender<UiEvent>,
    events: Receiver<UiEvent>,
    audio: Option<AudioHandle>,
    track_settings: PerTrack<TrackSettings>,
    bass_effects: EffectsState,
    bass_synth: SynthState,
}

struct AudioHandle {
    running: Arc<AtomicBool>,
    sample_rate: u32,
    thread: Option<JoinHandle<()>>,
}

impl AudioHandle {
    fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!(target: "audio", "audio thread panicked");
            }
        }
    }
}

/// Everything the audio thread needs, moved in at spawn.
struct AudioContext {
    backend: Backend,
    layout: Layout,
    commands: Receiver<Command>,
    events: Sender<UiEvent>,
    running: Arc<AtomicBool>,
}

impl Controller {
    /// Controller playing through the default audio device.
    pub fn new(midi: MidiService) -> Self {
        Self::with_backend(midi, Backend::Cpal)
    }

    pub fn with_backend(midi: MidiService, backend: Backend) -> Self {
        let (commands, command_rx) = crossbeam_channel::unbounded();
        let (events_tx, events) = crossbeam_channel::unbounded();
        let layout = Layout::default();
        let first = layout.patterns.first().cloned().unwrap_or_default();
        Self {
            layout,
            backend,
            midi,
            generator: Arc::new(NoGenerator),
            commands,
            command_rx,
            events_tx,
            events,
            audio: None,
            track_settings: first.track_settings,
            bass_effects: first.effects_state,
            bass_synth: first.synth_state,
        }
    }

    /// Use `generator` for parameter suggestions.
    pub fn with_generator(mut self, generator: impl ParamGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    // --- State ---

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn generator(&self) -> &dyn ParamGenerator {
        self.generator.as_ref()
    }

    pub fn midi(&mut self) -> &mut MidiService {
        &mut self.midi
    }

    /// Track settings last sent to the live mixer.
    pub fn track_settings(&self) -> &PerTrack<TrackSettings> {
        &self.track_settings
    }

    /// Bass effects last sent to the live engine.
    pub fn bass_effects(&self) -> &EffectsState {
        &self.bass_effects
    }

    /// Bass synth settings last sent to the live engine.
    pub fn bass_synth(&self) -> &SynthState {
        &self.bass_synth
    }

    /// Sample rate of the running output, if any.
    pub fn sample_rate(&self) -> Option<u32> {
        self.live().map(|a| a.sample_rate)
    }

    pub fn is_audio_running(&self) -> bool {
        self.live().is_some()
    }

    fn live(&self) -> Option<&AudioHandle> {
        self.audio.as_ref().filter(|a| a.is_alive())
    }

    fn send(&self, command: Command) {
        // The controller holds a receiver, so the channel stays open.
        if self.commands.send(command).is_err() {
            log::error!(target: "controller", "command channel closed");
        }
    }

    /// Send a command that only makes sense to a running engine.
    fn send_live(&self, command: Command) -> bool {
        if self.is_audio_running() {
            self.send(command);
            true
        } else {
            false
        }
    }

    // --- Transport ---

    /// Start playback, bringing up the audio output first if needed.
    /// A failed output is retried on the next call.
    pub fn start(&mut self) -> Result<(), AudioError> {
        self.ensure_audio()?;
        self.send(Command::Start);
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.send_live(Command::Stop) {
            // Nothing is playing; report the stopped state directly.
            let _ = self.events_tx.send(UiEvent::StepChanged(None));
            let _ = self.events_tx.send(UiEvent::Meters(MeterLevels::silent()));
        }
    }

    fn ensure_audio(&mut self) -> Result<(), AudioError> {
        if self.is_audio_running() {
            return Ok(());
        }
        if let Some(mut stale) = self.audio.take() {
            stale.shutdown();
        }

        let running = Arc::new(AtomicBool::new(true));
        let ctx = AudioContext {
            backend: self.backend,
            layout: self.layout.clone(),
            commands: self.command_rx.clone(),
            events: self.events_tx.clone(),
            running: running.clone(),
        };
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("rythmai-audio".into())
            .spawn(move || audio_thread(ctx, ready_tx))
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let ready = ready_rx.recv();
        match ready {
            Ok(Ok(sample_rate)) => {
                self.audio = Some(AudioHandle { running, sample_rate, thread: Some(thread) });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                log::warn!(target: "audio", "audio output unavailable: {e}");
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::DeviceInit("audio thread exited during startup".into()))
            }
        }
    }

    /// Stop the audio thread and release the output.
    pub fn shutdown(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.shutdown();
        }
    }

    // --- Layout and mixer ---

    /// Replace the layout. Bpm and master settings apply at once; drum
    /// tracks whose sample source changed are reloaded in the background.
    pub fn update_all(&mut self, layout: Layout) -> Vec<JoinHandle<Result<(), LoadError>>> {
        let changed = layout.changed_samples(&self.layout);
        self.layout = layout;
        self.send(Command::UpdateLayout(Box::new(self.layout.clone())));
        changed
            .into_iter()
            .map(|drum| self.load_sample(drum, self.layout.sample_source(drum).clone()))
            .collect()
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.layout.bpm = clamp_bpm(bpm);
        self.send(Command::SetBpm(bpm));
    }

    pub fn update_track_settings(&mut self, settings: PerTrack<TrackSettings>) {
        self.track_settings = settings;
        self.send(Command::SetTrackSettings(settings));
    }

    pub fn update_master_settings(&mut self, master: MasterSettings) {
        self.layout.master_settings = master;
        self.send(Command::SetMaster(master));
    }

    pub fn update_bass_effects(&mut self, effects: EffectsState) {
        self.bass_effects = effects;
        self.send(Command::SetBassEffects(effects));
    }

    pub fn set_bass_synth(&mut self, synth: SynthState) {
        self.bass_synth = synth;
        self.send(Command::SetBassSynth(synth));
    }

    // --- Samples ---

    /// Load a sample for a drum track in the background. The engine keeps
    /// the previous sample until the new one is fully decoded. The layout
    /// is not changed.
    pub fn load_sample(&self, drum: DrumTrack, source: SampleSource) -> JoinHandle<Result<(), LoadError>> {
        log::info!(target: "loader", "loading {drum} from {}", source.label());
        let commands = self.commands.clone();
        spawn_load(source, move |buffer| {
            commands.send(Command::ReplaceSample(drum, buffer)).map_err(|_| LoadError::Interrupted)
        })
    }

    /// Audition a sample source outside the arrangement.
    pub fn preview_sample(&mut self, source: SampleSource) -> JoinHandle<Result<(), LoadError>> {
        if let Err(e) = self.ensure_audio() {
            return thread::spawn(move || Err(LoadError::Audio(e)));
        }
        let commands = self.commands.clone();
        spawn_load(source, move |buffer| {
            commands.send(Command::Preview(buffer)).map_err(|_| LoadError::Interrupted)
        })
    }

    // --- Live input ---

    /// Play the bass synth. Velocity is MIDI 0..127.
    pub fn midi_note_on(&mut self, note: u8, velocity: u8) {
        let velocity = velocity.min(127) as f32 / 127.0;
        self.send_live(Command::NoteOn { note, velocity });
    }

    pub fn midi_note_off(&mut self, note: u8) {
        self.send_live(Command::NoteOff { note });
    }

    /// Apply a MIDI control change to the bass track or synth.
    pub fn control_change(&mut self, controller: u8, value: u8) {
        let v = value.min(127) as f32 / 127.0;
        match controller {
            cc::VOLUME => self.update_bass_track(TrackParam::VolumeDb(cc_volume_db(v))),
            cc::PAN => self.update_bass_track(TrackParam::Pan(cc_pan(value))),
            cc::RESONANCE => self.update_bass_synth(SynthParam::FilterQ(0.1 + v * 19.9)),
            cc::CUTOFF => self.update_bass_synth(SynthParam::FilterBaseFrequency(cc_frequency(v))),
            cc::ATTACK => self.update_bass_synth(SynthParam::Attack(v * v * 2.0)),
            cc::RELEASE => self.update_bass_synth(SynthParam::Release(v * v * 5.0)),
            _ => log::trace!(target: "midi", "unmapped controller {controller}"),
        }
    }

    fn update_bass_track(&mut self, param: TrackParam) {
        self.set_track_param(Track::Bass, param);
    }

    fn update_bass_synth(&mut self, param: SynthParam) {
        self.set_synth_param(param);
    }

    // --- Single-field updates ---

    pub fn set_track_param(&mut self, track: Track, param: TrackParam) {
        let mut settings = self.track_settings;
        settings[track].apply(param);
        self.update_track_settings(settings);
    }

    pub fn set_master_param(&mut self, param: MasterParam) {
        let mut master = self.layout.master_settings;
        master.apply(param);
        self.update_master_settings(master);
    }

    pub fn set_effect_param(&mut self, param: EffectParam) {
        let mut effects = self.bass_effects;
        effects.apply(param);
        self.update_bass_effects(effects);
    }

    pub fn set_synth_param(&mut self, param: SynthParam) {
        let mut synth = self.bass_synth;
        synth.apply(param);
        self.set_bass_synth(synth);
    }

    fn handle_midi(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } => self.midi_note_on(note, velocity),
            MidiEvent::NoteOff { note } => self.midi_note_off(note),
            MidiEvent::ControlChange { controller, value } => self.control_change(controller, value),
        }
    }

    // --- Generation ---

    /// Ask the generator for a drum sound and render it in the background.
    pub fn generate_and_render_drum(&self, kind: DrumSynthKind, description: &str) -> JoinHandle<Option<DrumPreview>> {
        let generator = self.generator.clone();
        let description = description.to_owned();
        thread::spawn(move || generate_drum(generator.as_ref(), kind, &description))
    }

    // --- Feedback ---

    /// Current master spectrum in dB, if audio is running.
    pub fn spectrum(&self) -> Option<Vec<f32>> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        if !self.send_live(Command::Spectrum(tx)) {
            return None;
        }
        rx.recv_timeout(SPECTRUM_TIMEOUT).ok()
    }

    /// Handle pending MIDI input and deliver transport feedback to `listener`.
    pub fn poll(&mut self, listener: &mut impl TransportListener) {
        let midi: Vec<MidiEvent> = self.midi.poll().collect();
        for event in midi {
            self.handle_midi(event);
        }
        for event in self.events.try_iter() {
            event.deliver(listener);
        }
    }

    // --- Offline ---

    /// Render the current layout to WAV bytes.
    pub fn export_wav(&self) -> Result<Vec<u8>, RenderError> {
        render::export_wav(&self.layout)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
        self.midi.teardown();
    }
}

/// CC7: linear fader onto -60..0 dB.
fn cc_volume_db(v: f32) -> f32 {
    -60.0 + v * 60.0
}

/// CC10: 64 is centre.
fn cc_pan(value: u8) -> f32 {
    ((value as f32 - 64.0) / 63.0).clamp(-1.0, 1.0)
}

/// CC74: exponential sweep over 20 Hz..20 kHz.
fn cc_frequency(v: f32) -> f32 {
    20.0 * 1000f32.powf(v)
}

fn audio_thread(ctx: AudioContext, ready: Sender<Result<u32, AudioError>>) {
    let mut output = match ry_audio::open_output(ctx.backend) {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let sample_rate = output.sample_rate();
    let mut player = Player::new(ctx.layout.clone(), sample_rate, ResyncPolicy::OnPatternChange);
    if let Some(pattern) = ctx.layout.patterns.first() {
        player.engine_mut().apply_pattern(pattern);
    }
    for drum in DrumTrack::ALL {
        match load_source(ctx.layout.sample_source(drum)) {
            Ok(buffer) => player.engine_mut().replace_sample(drum, buffer),
            Err(e) => log::warn!(target: "loader", "{drum} sample unavailable: {e}"),
        }
    }
    let _ = ready.send(Ok(sample_rate));

    run_audio_loop(&ctx, &mut player, output.as_mut());

    if let Err(e) = output.stop() {
        log::warn!(target: "audio", "failed to stop output: {e}");
    }
    log::debug!(target: "audio", "audio thread finished");
}

fn run_audio_loop(ctx: &AudioContext, player: &mut Player, output: &mut dyn AudioOutput) {
    let realtime = output.is_realtime();
    let mut block = [Frame::silence(); BLOCK_FRAMES];

    while ctx.running.load(Ordering::Acquire) {
        if !realtime && !player.is_playing() {
            match ctx.commands.recv_timeout(IDLE_WAIT) {
                Ok(command) => command.apply(player),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        for command in ctx.commands.try_iter() {
            command.apply(player);
        }

        player.render_block(&mut block);
        for event in player.drain_ui_events() {
            if ctx.events.send(event).is_err() {
                return;
            }
        }

        if let Err(e) = output.write(&block) {
            log::error!(target: "audio", "output write failed: {e}");
            return;
        }
    }
}
