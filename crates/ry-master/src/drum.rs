//! Drum synth rendering to WAV.

use ry_engine::{render_drum, PROJECT_SAMPLE_RATE};
use ry_ir::{AudioBuffer, DrumSynth};

/// Render a drum synth at the project sample rate as mono 16-bit WAV bytes.
pub fn render_drum_sample(drum: &DrumSynth) -> Vec<u8> {
    let samples = render_drum(drum, PROJECT_SAMPLE_RATE);
    ry_formats::encode_wav(&AudioBuffer::from_mono(samples, PROJECT_SAMPLE_RATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ry_ir::DrumSynthKind;

    #[test]
    fn wav_length_matches_duration() {
        let drum = DrumSynth::default_for(DrumSynthKind::Noise);
        let wav = render_drum_sample(&drum);
        let frames = (drum.duration() * PROJECT_SAMPLE_RATE as f32).round() as usize;
        assert_eq!(wav.len(), ry_formats::WAV_HEADER_LEN + frames * 2);
        assert_eq!(&wav[0..4], b"RIFF");
    }

    #[test]
    fn decodes_back_to_the_same_length() {
        let drum = DrumSynth::default_for(DrumSynthKind::Membrane);
        let wav = render_drum_sample(&drum);
        let buffer = ry_formats::decode_wav(&wav).unwrap();
        assert_eq!(buffer.sample_rate, PROJECT_SAMPLE_RATE);
        assert_eq!(buffer.len(), render_drum(&drum, PROJECT_SAMPLE_RATE).len());
    }
}
