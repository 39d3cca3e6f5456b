//! WAV encoding for 16-bit PCM.

use std::io::Write;

use ry_ir::AudioBuffer;

/// Size of the canonical RIFF/WAVE/fmt/data header.
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;

/// Float sample to 16-bit PCM: clamp, scale negatives by 32768 and positives
/// by 32767, then truncate.
#[inline]
pub fn pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled as i16
}

/// Encode a buffer as interleaved 16-bit PCM WAV bytes.
pub fn encode_wav(buffer: &AudioBuffer) -> Vec<u8> {
    let num_channels = buffer.channels();
    let block_align = num_channels * (BITS_PER_SAMPLE / 8);
    let data_size = buffer.frames() as u32 * block_align as u32;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);
    write_riff_header(&mut out, data_size);
    write_fmt_chunk(&mut out, num_channels, buffer.sample_rate(), block_align);
    write_data_chunk(&mut out, buffer, data_size);
    out
}

pub fn write_wav(w: &mut impl Write, buffer: &AudioBuffer) -> std::io::Result<()> {
    w.write_all(&encode_wav(buffer))
}

fn write_riff_header(out: &mut Vec<u8>, data_size: u32) {
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");
}

fn write_fmt_chunk(out: &mut Vec<u8>, num_channels: u16, sample_rate: u32, block_align: u16) {
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
}

fn write_data_chunk(out: &mut Vec<u8>, buffer: &AudioBuffer, data_size: u32) {
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for frame in 0..buffer.frames() {
        for ch in 0..buffer.channels() {
            out.extend_from_slice(&pcm16(buffer.sample(ch, frame)).to_le_bytes());
        }
    }
}
