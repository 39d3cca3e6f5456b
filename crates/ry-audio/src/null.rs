//! Output that discards audio.

use ry_engine::Frame;

use crate::traits::{AudioError, AudioOutput};

/// Accepts frames immediately and counts them.
#[derive(Clone, Debug)]
pub struct NullOutput {
    sample_rate: u32,
    frames_written: u64,
    running: bool,
}

impl NullOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, frames_written: 0, running: false }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, frames: &[Frame]) -> Result<(), AudioError> {
        if !self.running {
            return Err(AudioError::Playback("output not started".into()));
        }
        self.frames_written += frames.len() as u64;
        Ok(())
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running = false;
        Ok(())
    }

    fn is_realtime(&self) -> bool {
        false
    }
}
