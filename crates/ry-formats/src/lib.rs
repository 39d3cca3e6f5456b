//! Audio file formats for the rythmai sequencer.
//!
//! Encodes rendered buffers as 16-bit PCM WAV and decodes WAV sample files
//! into mono sample buffers.

mod decode;
mod wav;

pub use decode::{decode_wav, read_wav};
pub use wav::{encode_wav, pcm16, write_wav, WAV_HEADER_LEN};

/// Error type for format handling.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("WAV decode failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported WAV data: {0}")]
    Unsupported(String),
    #[error("WAV file contains no audio")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FormatResult<T> = Result<T, FormatError>;
