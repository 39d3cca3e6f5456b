//! WAV decoding into mono sample buffers.

use std::io::Cursor;
use std::path::Path;

use ry_ir::SampleBuffer;

use crate::{FormatError, FormatResult};

/// Decode WAV bytes, downmixing every channel to mono.
pub fn decode_wav(bytes: &[u8]) -> FormatResult<SampleBuffer> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(FormatError::Unsupported("zero channels".into()));
    }
    if spec.sample_rate == 0 {
        return Err(FormatError::Unsupported("zero sample rate".into()));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(FormatError::Unsupported(format!("{} bits per sample", spec.bits_per_sample)));
            }
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<_, _>>()?
        }
    };
    if samples.is_empty() {
        return Err(FormatError::Empty);
    }

    let mono = samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok(SampleBuffer::new(mono, spec.sample_rate))
}

/// Read and decode a WAV file from disk.
pub fn read_wav(path: &Path) -> FormatResult<SampleBuffer> {
    let bytes = std::fs::read(path)?;
    decode_wav(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_wav;
    use ry_ir::AudioBuffer;

    #[test]
    fn decodes_own_encoding() {
        let buffer = AudioBuffer::from_mono(vec![0.0, -0.5, -1.0], 22050);
        let decoded = decode_wav(&encode_wav(&buffer)).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.data, vec![0.0, -0.5, -1.0]);
    }

    #[test]
    fn stereo_is_downmixed() {
        let mut buffer = AudioBuffer::new(2, 1, 8000);
        buffer.channel_mut(0)[0] = -0.5;
        buffer.channel_mut(1)[0] = 0.0;
        let decoded = decode_wav(&encode_wav(&buffer)).unwrap();
        assert_eq!(decoded.data, vec![-0.25]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_wav(b"not a wav file"), Err(FormatError::Wav(_))));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let mut bytes = encode_wav(&AudioBuffer::from_mono(vec![0.5; 8], 8000));
        bytes[24..28].copy_from_slice(&0u32.to_le_bytes());
        assert!(decode_wav(&bytes).is_err());
    }

    #[test]
    fn empty_data_is_rejected() {
        let buffer = AudioBuffer::from_mono(Vec::new(), 8000);
        assert!(matches!(decode_wav(&encode_wav(&buffer)), Err(FormatError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_wav(Path::new("/nonexistent/kick.wav")).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
