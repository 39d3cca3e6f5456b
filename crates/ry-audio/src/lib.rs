//! Audio output backends for the rythmai sequencer.

mod cpal_backend;
mod null;
mod traits;

pub use cpal_backend::CpalOutput;
pub use null::NullOutput;
pub use traits::{AudioError, AudioOutput};

/// Which output to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// The default device through cpal.
    Cpal,
    /// Discard audio at the given rate, as fast as it is rendered.
    Null { sample_rate: u32 },
}

/// Open and start an output. cpal streams are not `Send`, so call this on
/// the thread that will write to the output.
pub fn open_output(backend: Backend) -> Result<Box<dyn AudioOutput>, AudioError> {
    let mut output: Box<dyn AudioOutput> = match backend {
        Backend::Cpal => {
            let (mut output, consumer) = CpalOutput::new()?;
            output.build_stream(consumer)?;
            Box::new(output)
        }
        Backend::Null { sample_rate } => Box::new(NullOutput::new(sample_rate)),
    };
    output.start()?;
    log::info!(target: "audio", "opened {:?} output at {} Hz", backend, output.sample_rate());
    Ok(output)
}
