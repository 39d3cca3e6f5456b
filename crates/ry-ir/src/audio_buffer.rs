//! Multichannel f32 audio buffer with planar layout.

use core::ops::Range;

/// A multichannel f32 audio buffer in planar layout.
///
/// Data is stored as `channels` contiguous planes of `frames` samples each.
/// `data[ch * frames + frame]` gives the sample for channel `ch` at `frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    data: Vec<f32>,
    channels: u16,
    frames: usize,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new silent buffer with the given dimensions.
    pub fn new(channels: u16, frames: usize, sample_rate: u32) -> Self {
        Self {
            data: vec![0.0; channels as usize * frames],
            channels,
            frames,
            sample_rate,
        }
    }

    /// Build a mono buffer from samples.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        let frames = samples.len();
        Self { data: samples, channels: 1, frames, sample_rate }
    }

    /// Number of channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    /// Read-only access to one channel's sample data.
    pub fn channel(&self, ch: u16) -> &[f32] {
        let start = ch as usize * self.frames;
        &self.data[start..start + self.frames]
    }

    /// Mutable access to one channel's sample data.
    pub fn channel_mut(&mut self, ch: u16) -> &mut [f32] {
        let start = ch as usize * self.frames;
        let len = self.frames;
        &mut self.data[start..start + len]
    }

    /// Sample at `frame` in channel `ch`.
    pub fn sample(&self, ch: u16, frame: usize) -> f32 {
        self.data[ch as usize * self.frames + frame]
    }

    /// Scale all samples by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for s in &mut self.data {
            *s *= gain;
        }
    }

    /// Largest absolute sample value over all channels.
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    /// Largest absolute sample value in a frame range over all channels.
    pub fn peak_in(&self, frames: Range<usize>) -> f32 {
        let end = frames.end.min(self.frames);
        let start = frames.start.min(end);
        (0..self.channels)
            .flat_map(|ch| self.channel(ch)[start..end].iter())
            .fold(0.0, |m, s| m.max(s.abs()))
    }
}
