//! Generated suggestions never leave partial state behind.

use serde_json::{json, Value};

use ry_ir::{OscillatorType, Pattern, SynthParam};
use ry_master::{regenerate_chords, suggest_synth, GenerationError, GenerationKind};

fn answering(value: Value) -> impl Fn(GenerationKind, &str) -> Result<Option<Value>, GenerationError> + Send + Sync {
    move |_: GenerationKind, _: &str| Ok(Some(value.clone()))
}

#[test]
fn short_chord_progression_is_rejected() {
    let mut pattern = Pattern::starter();
    let before = pattern.clone();
    let gen = answering(json!({ "progression": ["Am", "F", "C", "G", null, null] }));

    let result = regenerate_chords(&gen, "melancholy", &mut pattern);
    assert!(matches!(result, Err(GenerationError::Invalid(_))));
    assert_eq!(pattern, before);
}

#[test]
fn full_progression_replaces_chords() {
    let mut pattern = Pattern::starter();
    let mut entries = vec![Value::Null; 16];
    entries[0] = json!("Dm7");
    let gen = answering(Value::from(entries));

    regenerate_chords(&gen, "jazzy", &mut pattern).unwrap();
    assert_eq!(pattern.sequencer_state.chords.steps[0], "Dm7".parse().ok());
    assert_eq!(pattern.sequencer_state.chords.steps[8], None);
    assert_eq!(pattern.sequencer_state.bass, Pattern::starter().sequencer_state.bass);
}

#[test]
fn partial_synth_answer_is_rejected_whole() {
    let gen = answering(json!({ "oscillator": "square" }));
    let mut pattern = Pattern::starter();
    pattern.synth_state.apply(SynthParam::Oscillator(OscillatorType::Triangle));
    let before = pattern.synth_state;

    let result = suggest_synth(&gen, "buzzy");
    assert!(matches!(result, Err(GenerationError::Malformed(_))));
    if let Ok(synth) = result {
        pattern.synth_state = synth;
    }
    assert_eq!(pattern.synth_state, before);
    assert_eq!(pattern.synth_state.oscillator, OscillatorType::Triangle);
}
