//! Note names, pitches and chord symbols.

use arrayvec::ArrayVec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Maximum number of notes in a voiced chord.
pub const MAX_CHORD_NOTES: usize = 4;

/// MIDI note of the octave chords are voiced from (C4).
pub const CHORD_BASE_NOTE: u8 = 60;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Parse a note letter with optional accidental, returning semitones above C
/// (-1 for `Cb`, 12 for `B#`) and the remaining input.
fn parse_note_letter(s: &str) -> Option<(i8, &str)> {
    let mut chars = s.chars();
    let base: i8 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (shift, rest) = match rest.as_bytes().first() {
        Some(b'#') => (1, &rest[1..]),
        Some(b'b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    Some((base + shift, rest))
}

/// A MIDI note number, written as a note name such as `C2` or `F#1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(pub u8);

impl Pitch {
    pub fn midi(self) -> u8 {
        self.0
    }

    /// Equal-tempered frequency with A4 = 440 Hz.
    pub fn frequency(self) -> f32 {
        midi_to_frequency(self.0)
    }
}

pub fn midi_to_frequency(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

impl FromStr for Pitch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (semitone, rest) = parse_note_letter(s.trim()).ok_or_else(|| format!("invalid note '{s}'"))?;
        let octave: i32 = rest.parse().map_err(|_| format!("invalid octave in '{s}'"))?;
        let midi = (octave + 1) * 12 + semitone as i32;
        u8::try_from(midi)
            .ok()
            .filter(|m| *m <= 127)
            .map(Pitch)
            .ok_or_else(|| format!("note '{s}' out of range"))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let octave = self.0 as i32 / 12 - 1;
        write!(f, "{}{}", SHARP_NAMES[(self.0 % 12) as usize], octave)
    }
}

impl TryFrom<String> for Pitch {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Pitch> for String {
    fn from(p: Pitch) -> String {
        p.to_string()
    }
}

/// Chord quality suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

impl ChordQuality {
    fn parse(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "" | "maj" | "M" => ChordQuality::Major,
            "m" | "min" => ChordQuality::Minor,
            "7" => ChordQuality::Dominant7,
            "maj7" | "M7" => ChordQuality::Major7,
            "m7" | "min7" => ChordQuality::Minor7,
            "dim" => ChordQuality::Diminished,
            "aug" | "+" => ChordQuality::Augmented,
            "sus2" => ChordQuality::Sus2,
            "sus4" | "sus" => ChordQuality::Sus4,
            _ => return None,
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }

    /// Semitone offsets from the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
        }
    }
}

/// A chord symbol such as `Am`, `F#m7` or `Gsus4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord {
    /// Pitch class of the root (0 = C).
    pub root: u8,
    pub quality: ChordQuality,
}

impl Chord {
    /// The chord voiced upward from C4.
    pub fn notes(&self) -> ArrayVec<Pitch, MAX_CHORD_NOTES> {
        self.quality
            .intervals()
            .iter()
            .map(|i| Pitch(CHORD_BASE_NOTE + self.root + i))
            .collect()
    }
}

impl FromStr for Chord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (semitone, rest) = parse_note_letter(s.trim()).ok_or_else(|| format!("invalid chord '{s}'"))?;
        let root = semitone.rem_euclid(12) as u8;
        let quality = ChordQuality::parse(rest).ok_or_else(|| format!("unknown chord quality in '{s}'"))?;
        Ok(Chord { root, quality })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SHARP_NAMES[self.root as usize], self.quality.suffix())
    }
}

impl TryFrom<String> for Chord {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Chord> for String {
    fn from(c: Chord) -> String {
        c.to_string()
    }
}
