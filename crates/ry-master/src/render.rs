//! Offline rendering of a whole arrangement.
//!
//! Every call builds its own [`Player`] with its own engine and voices, so
//! renders never share state with live playback or with each other.

use std::io::Write;

use ry_engine::{Frame, Player, ResyncPolicy, PROJECT_SAMPLE_RATE};
use ry_ir::{AudioBuffer, DrumTrack, Layout};

use crate::error::RenderError;
use crate::loader::load_source;

/// File name offered for exported songs.
pub const EXPORT_FILE_NAME: &str = "rythmai-song.wav";

const BLOCK_FRAMES: usize = 512;

/// Render one pass through the arrangement to a stereo buffer at the
/// project sample rate.
pub fn render(layout: &Layout) -> Result<AudioBuffer, RenderError> {
    ry_ir::persist::validate(layout)?;

    let sample_rate = PROJECT_SAMPLE_RATE;
    let mut player = Player::new(layout.clone(), sample_rate, ResyncPolicy::EveryBar);

    // Every sample is in place before the first bar is scheduled.
    for drum in DrumTrack::ALL {
        let buffer = load_source(layout.sample_source(drum)).map_err(|source| RenderError::Load { drum, source })?;
        player.engine_mut().replace_sample(drum, buffer);
    }

    let total = (layout.total_seconds() * sample_rate as f64).round() as usize;
    log::info!(
        target: "render",
        "rendering {} bars ({total} frames) at {} bpm",
        layout.arrangement.len(),
        layout.bpm
    );

    let mut left = Vec::with_capacity(total);
    let mut right = Vec::with_capacity(total);
    let mut block = [Frame::silence(); BLOCK_FRAMES];

    player.start();
    while left.len() < total {
        let n = (total - left.len()).min(BLOCK_FRAMES);
        player.render_block(&mut block[..n]);
        for frame in &block[..n] {
            left.push(frame.left);
            right.push(frame.right);
        }
        // UI feedback has no listener offline.
        player.drain_ui_events();
    }

    let mut buffer = AudioBuffer::new(2, total, sample_rate);
    buffer.channel_mut(0).copy_from_slice(&left);
    buffer.channel_mut(1).copy_from_slice(&right);
    Ok(buffer)
}

/// Render and encode as 16-bit PCM WAV.
pub fn export_wav(layout: &Layout) -> Result<Vec<u8>, RenderError> {
    Ok(ry_formats::encode_wav(&render(layout)?))
}

/// Render and write WAV to `w`. Nothing is written if rendering fails.
pub fn write_export(w: &mut impl Write, layout: &Layout) -> Result<(), RenderError> {
    let buffer = render(layout)?;
    ry_formats::write_wav(w, &buffer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ry_ir::{DrumSteps, Pattern, SampleSource, SequencerState};
    use std::path::PathBuf;

    fn kick_layout(arrangement: Vec<Option<usize>>) -> Layout {
        let sequencer_state = SequencerState { kick: DrumSteps::hits(&[0]), ..SequencerState::default() };
        Layout {
            patterns: vec![Pattern { sequencer_state, ..Pattern::default() }],
            arrangement,
            ..Layout::default()
        }
    }

    #[test]
    fn length_is_bars_times_bar_duration() {
        let layout = kick_layout(vec![Some(0), Some(0)]);
        let buffer = render(&layout).unwrap();
        // 2 bars of 2 seconds at 120 bpm.
        assert_eq!(buffer.frames(), 4 * PROJECT_SAMPLE_RATE as usize);
        assert_eq!(buffer.channels(), 2);
        assert!(buffer.peak() > 0.0);
    }

    #[test]
    fn empty_arrangement_renders_nothing() {
        let buffer = render(&kick_layout(vec![])).unwrap();
        assert_eq!(buffer.frames(), 0);
    }

    #[test]
    fn corrupt_layout_is_rejected() {
        let layout = kick_layout(vec![Some(3)]);
        assert!(matches!(render(&layout), Err(RenderError::Layout(_))));
    }

    #[test]
    fn unreadable_sample_fails_the_render() {
        let mut layout = kick_layout(vec![Some(0)]);
        layout.sample_settings[DrumTrack::Snare] = SampleSource::File { path: PathBuf::from("/nonexistent/snare.wav") };
        match render(&layout) {
            Err(RenderError::Load { drum, .. }) => assert_eq!(drum, DrumTrack::Snare),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn failed_export_writes_nothing() {
        let mut out = Vec::new();
        assert!(write_export(&mut out, &kick_layout(vec![Some(9)])).is_err());
        assert!(out.is_empty());
    }
}
