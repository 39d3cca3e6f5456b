//! Interface to an external parameter generator.
//!
//! The generator is opaque: it takes a kind and a text prompt and may
//! return a JSON value. Everything it returns is validated here before it
//! can reach a pattern or the engine. A rejected suggestion never changes
//! anything.

use serde_json::{json, Value};

use ry_ir::{Chord, DrumSynth, DrumSynthKind, EffectsState, Pattern, SynthState, STEPS_PER_BAR};

use crate::drum::render_drum_sample;
use crate::error::GenerationError;

/// What the generator is asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationKind {
    Synth,
    Effects,
    Chords,
    Drum(DrumSynthKind),
}

pub trait ParamGenerator: Send + Sync {
    /// `Ok(None)` means the generator had nothing to suggest.
    fn generate(&self, kind: GenerationKind, input: &str) -> Result<Option<Value>, GenerationError>;
}

impl<F> ParamGenerator for F
where
    F: Fn(GenerationKind, &str) -> Result<Option<Value>, GenerationError> + Send + Sync,
{
    fn generate(&self, kind: GenerationKind, input: &str) -> Result<Option<Value>, GenerationError> {
        self(kind, input)
    }
}

/// Generator used when no service is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGenerator;

impl ParamGenerator for NoGenerator {
    fn generate(&self, _kind: GenerationKind, _input: &str) -> Result<Option<Value>, GenerationError> {
        Ok(None)
    }
}

fn request(gen: &dyn ParamGenerator, kind: GenerationKind, input: &str) -> Result<Value, GenerationError> {
    match gen.generate(kind, input)? {
        Some(Value::Null) | None => Err(GenerationError::Empty),
        Some(value) => Ok(value),
    }
}

/// Ask for a bass synth configuration.
pub fn suggest_synth(gen: &dyn ParamGenerator, prompt: &str) -> Result<SynthState, GenerationError> {
    let synth: SynthState = serde_json::from_value(request(gen, GenerationKind::Synth, prompt)?)?;
    synth.validate().map_err(GenerationError::Invalid)?;
    Ok(synth)
}

/// Ask for bass effects settings.
pub fn suggest_effects(gen: &dyn ParamGenerator, prompt: &str) -> Result<EffectsState, GenerationError> {
    let effects: EffectsState = serde_json::from_value(request(gen, GenerationKind::Effects, prompt)?)?;
    effects.validate().map_err(GenerationError::Invalid)?;
    Ok(effects)
}

/// Ask for a chord progression fitting `bassline`, one entry per step.
///
/// The answer may be a bare array or `{"progression": [...]}`; entries are
/// chord names or `null` for a rest. Anything but exactly 16 entries is
/// rejected.
pub fn suggest_chords(
    gen: &dyn ParamGenerator,
    prompt: &str,
    bassline: &[Option<ry_ir::Pitch>; STEPS_PER_BAR],
) -> Result<[Option<Chord>; STEPS_PER_BAR], GenerationError> {
    let input = json!({ "prompt": prompt, "bassline": bassline }).to_string();
    let value = match request(gen, GenerationKind::Chords, &input)? {
        Value::Object(mut map) => map
            .remove("progression")
            .ok_or_else(|| GenerationError::Invalid("missing progression".into()))?,
        other => other,
    };
    let chords: Vec<Option<Chord>> = serde_json::from_value(value)?;
    let len = chords.len();
    chords
        .try_into()
        .map_err(|_| GenerationError::Invalid(format!("expected {STEPS_PER_BAR} chords, got {len}")))
}

/// Replace a pattern's chords with a suggestion for its bassline. The
/// pattern is left untouched on error.
pub fn regenerate_chords(
    gen: &dyn ParamGenerator,
    prompt: &str,
    pattern: &mut Pattern,
) -> Result<(), GenerationError> {
    let chords = suggest_chords(gen, prompt, &pattern.sequencer_state.bass.steps)?;
    pattern.sequencer_state.chords.steps = chords;
    Ok(())
}

/// Ask for a drum sound of the given kind.
///
/// The `synth` tag may be omitted from the answer; if present it has to
/// match `kind`.
pub fn suggest_drum(
    gen: &dyn ParamGenerator,
    kind: DrumSynthKind,
    description: &str,
) -> Result<DrumSynth, GenerationError> {
    let mut value = request(gen, GenerationKind::Drum(kind), description)?;
    let Value::Object(map) = &mut value else {
        return Err(GenerationError::Invalid("drum settings must be an object".into()));
    };
    map.entry("synth").or_insert_with(|| Value::from(kind.name()));
    let drum: DrumSynth = serde_json::from_value(value)?;
    if drum.kind() != kind {
        return Err(GenerationError::Invalid(format!("asked for {kind}, got {}", drum.kind())));
    }
    drum.validate().map_err(GenerationError::Invalid)?;
    Ok(drum)
}

/// A generated drum sound and its rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct DrumPreview {
    pub drum: DrumSynth,
    /// Mono 16-bit WAV at the project sample rate.
    pub wav: Vec<u8>,
}

/// Generate a drum sound and render it. Failures are logged and yield `None`.
pub fn generate_drum(gen: &dyn ParamGenerator, kind: DrumSynthKind, description: &str) -> Option<DrumPreview> {
    match suggest_drum(gen, kind, description) {
        Ok(drum) => Some(DrumPreview { wav: render_drum_sample(&drum), drum }),
        Err(e) => {
            log::warn!(target: "assist", "no {kind} drum for '{description}': {e}");
            None
        }
    }
}
