//! Playback engine for the rythmai sequencer.
//!
//! Instruments, mixer and effects run per frame; the [`Player`] drives them
//! from a layout's arrangement on a single sample clock, for live output and
//! for offline rendering alike.

mod channel;
pub mod drum_synth;
pub mod dsp;
mod event;
mod event_queue;
mod frame;
mod graph;
mod mixer;
mod player;
pub mod scheduler;
mod synth;
mod transport;
mod voice;
mod voice_pool;

pub use channel::{ChannelStrip, TrackParams};
pub use drum_synth::render_drum;
pub use dsp::meter::{FFT_SIZE, SPECTRUM_BINS};
pub use event::{Event, EventPayload, EventTarget, FrameTime};
pub use event_queue::EventQueue;
pub use frame::Frame;
pub use graph::SignalGraph;
pub use mixer::Engine;
pub use player::Player;
pub use scheduler::{expand_pattern, StepAction, StepEvent};
pub use synth::{MonoSynth, PolySynth};
pub use transport::{MeterLevels, ResyncPolicy, StepPosition, TransportListener, TransportState, UiEvent};
pub use voice::SamplePlayer;
pub use voice_pool::{SampleKey, VoiceOutputs, VoicePool};

/// Sample rate used for offline rendering and drum synthesis.
pub const PROJECT_SAMPLE_RATE: u32 = 44_100;
