//! Turning sample sources into decoded sample buffers.

use std::thread::{self, JoinHandle};

use ry_engine::{render_drum, PROJECT_SAMPLE_RATE};
use ry_ir::{DrumSynth, SampleBuffer, SampleSource};

use crate::error::LoadError;

/// Load one sample source. Builtin and synth sources are rendered at the
/// project sample rate; files keep their own rate.
pub fn load_source(source: &SampleSource) -> Result<SampleBuffer, LoadError> {
    let drum = match source {
        SampleSource::File { path } => {
            let buffer = ry_formats::read_wav(path)?;
            log::debug!(
                target: "loader",
                "decoded {}: {} frames at {} Hz",
                path.display(),
                buffer.len(),
                buffer.sample_rate
            );
            return Ok(buffer);
        }
        SampleSource::Builtin { sound } => DrumSynth::builtin(*sound),
        SampleSource::Synth { drum } => {
            drum.validate().map_err(LoadError::Invalid)?;
            *drum
        }
    };
    Ok(SampleBuffer::new(render_drum(&drum, PROJECT_SAMPLE_RATE), PROJECT_SAMPLE_RATE))
}

/// Load a source on a background thread, handing the buffer to `publish`
/// once it is fully decoded.
pub fn spawn_load<F>(source: SampleSource, publish: F) -> JoinHandle<Result<(), LoadError>>
where
    F: FnOnce(SampleBuffer) -> Result<(), LoadError> + Send + 'static,
{
    thread::spawn(move || match load_source(&source) {
        Ok(buffer) => publish(buffer),
        Err(e) => {
            log::warn!(target: "loader", "{}: {e}", source.label());
            Err(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ry_ir::{AudioBuffer, DrumTrack, NoiseSettings};
    use std::path::PathBuf;

    #[test]
    fn builtin_renders_at_project_rate() {
        let buffer = load_source(&SampleSource::builtin(DrumTrack::Kick)).unwrap();
        assert_eq!(buffer.sample_rate, PROJECT_SAMPLE_RATE);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn file_keeps_its_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("click.wav");
        let samples: Vec<f32> = (0..2205).map(|i| if i < 10 { 0.5 } else { 0.0 }).collect();
        std::fs::write(&path, ry_formats::encode_wav(&AudioBuffer::from_mono(samples, 22050))).unwrap();

        let buffer = load_source(&SampleSource::File { path }).unwrap();
        assert_eq!(buffer.sample_rate, 22050);
        assert_eq!(buffer.len(), 2205);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let source = SampleSource::File { path: PathBuf::from("/nonexistent/kick.wav") };
        assert!(matches!(load_source(&source), Err(LoadError::Decode(_))));
    }

    #[test]
    fn invalid_synth_is_rejected() {
        let drum = DrumSynth::Noise(NoiseSettings { duration: -1.0, ..NoiseSettings::default() });
        assert!(matches!(load_source(&SampleSource::Synth { drum }), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn spawned_load_publishes_buffer() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = spawn_load(SampleSource::builtin(DrumTrack::Hihat), move |buffer| {
            tx.send(buffer).map_err(|_| LoadError::Interrupted)
        });
        assert!(handle.join().unwrap().is_ok());
        assert!(!rx.recv().unwrap().is_empty());
    }
}
