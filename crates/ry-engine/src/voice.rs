//! Voice: monophonic sample player.

use ry_ir::SampleBuffer;

use crate::SampleKey;

/// Plays one sample buffer from the bank. Retriggering restarts playback.
#[derive(Clone, Debug)]
pub struct SamplePlayer {
    /// Which sample this player reads.
    pub sample_key: Option<SampleKey>,
    /// Fractional read position in source frames.
    pub position: f64,
    /// Source frames advanced per output frame.
    pub increment: f64,
    pub playing: bool,
    pub velocity: f32,
    sample_rate: f32,
}

impl SamplePlayer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_key: None,
            position: 0.0,
            increment: 1.0,
            playing: false,
            velocity: 1.0,
            sample_rate,
        }
    }

    /// Point the player at a new sample, stopping any current playback.
    /// A buffer without a sample rate leaves the player silent.
    pub fn set_sample(&mut self, key: SampleKey, buffer: &SampleBuffer) {
        self.sample_key = (buffer.sample_rate > 0).then_some(key);
        self.increment = buffer.sample_rate as f64 / self.sample_rate as f64;
        self.stop();
    }

    pub fn trigger(&mut self, velocity: f32) {
        if self.sample_key.is_some() {
            self.position = 0.0;
            self.velocity = velocity;
            self.playing = true;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.position = 0.0;
    }

    /// Produce the next mono sample, reading from the given buffer.
    #[inline]
    pub fn render_with_source(&mut self, buffer: &SampleBuffer) -> f32 {
        if !self.playing {
            return 0.0;
        }
        let value = buffer.read_interpolated(self.position) * self.velocity;
        self.position += self.increment;
        if self.position >= buffer.len() as f64 {
            self.playing = false;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn player_with(buffer: &SampleBuffer, engine_rate: f32) -> SamplePlayer {
        let mut bank: SlotMap<SampleKey, SampleBuffer> = SlotMap::with_key();
        let key = bank.insert(buffer.clone());
        let mut player = SamplePlayer::new(engine_rate);
        player.set_sample(key, buffer);
        player
    }

    #[test]
    fn idle_player_is_silent() {
        let buffer = SampleBuffer::new(vec![1.0; 4], 44100);
        let mut player = player_with(&buffer, 44100.0);
        assert_eq!(player.render_with_source(&buffer), 0.0);
    }

    #[test]
    fn plays_to_end_then_stops() {
        let buffer = SampleBuffer::new(vec![0.5, 0.25, -0.5], 44100);
        let mut player = player_with(&buffer, 44100.0);
        player.trigger(1.0);
        let out: Vec<f32> = (0..5).map(|_| player.render_with_source(&buffer)).collect();
        assert_eq!(out, vec![0.5, 0.25, -0.5, 0.0, 0.0]);
        assert!(!player.playing);
    }

    #[test]
    fn half_rate_sample_is_interpolated() {
        let buffer = SampleBuffer::new(vec![0.0, 1.0, 0.0], 22050);
        let mut player = player_with(&buffer, 44100.0);
        player.trigger(1.0);
        let out: Vec<f32> = (0..4).map(|_| player.render_with_source(&buffer)).collect();
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn retrigger_restarts() {
        let buffer = SampleBuffer::new(vec![1.0, 0.5, 0.25, 0.125], 44100);
        let mut player = player_with(&buffer, 44100.0);
        player.trigger(1.0);
        player.render_with_source(&buffer);
        player.render_with_source(&buffer);
        player.trigger(0.5);
        assert_eq!(player.render_with_source(&buffer), 0.5);
    }

    #[test]
    fn rateless_sample_stays_silent() {
        let buffer = SampleBuffer::new(vec![1.0; 4], 0);
        let mut player = player_with(&buffer, 44100.0);
        player.trigger(1.0);
        assert!(!player.playing);
        assert_eq!(player.render_with_source(&buffer), 0.0);
    }

    #[test]
    fn trigger_without_sample_does_nothing() {
        let mut player = SamplePlayer::new(44100.0);
        player.trigger(1.0);
        assert!(!player.playing);
    }
}
