//! Error taxonomy of the controller.

use ry_audio::AudioError;
use ry_formats::FormatError;
use ry_ir::{DrumTrack, LayoutError};
use thiserror::Error;

/// A sample source could not be turned into audio.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to decode sample: {0}")]
    Decode(#[from] FormatError),

    #[error("invalid sample source: {0}")]
    Invalid(String),

    #[error("audio output unavailable: {0}")]
    Audio(#[from] AudioError),

    #[error("sample loader stopped before finishing")]
    Interrupted,
}

/// The parameter generator produced nothing usable.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator failed: {0}")]
    Service(String),

    #[error("generator returned no suggestion")]
    Empty,

    #[error("malformed suggestion: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("suggestion rejected: {0}")]
    Invalid(String),
}

/// An offline render could not be completed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to load {drum} sample: {source}")]
    Load {
        drum: DrumTrack,
        #[source]
        source: LoadError,
    },

    #[error("failed to write WAV: {0}")]
    Encode(#[from] std::io::Error),
}
