//! Track identifiers and per-track tables.

use core::fmt;
use core::ops::{Index, IndexMut};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One of the five instrument tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Kick,
    Snare,
    Hihat,
    Bass,
    Chords,
}

impl Track {
    /// All tracks in mixer order.
    pub const ALL: [Track; 5] = [Track::Kick, Track::Snare, Track::Hihat, Track::Bass, Track::Chords];

    pub fn name(self) -> &'static str {
        match self {
            Track::Kick => "kick",
            Track::Snare => "snare",
            Track::Hihat => "hihat",
            Track::Bass => "bass",
            Track::Chords => "chords",
        }
    }

    /// The drum track this is, if it is sample based.
    pub fn as_drum(self) -> Option<DrumTrack> {
        match self {
            Track::Kick => Some(DrumTrack::Kick),
            Track::Snare => Some(DrumTrack::Snare),
            Track::Hihat => Some(DrumTrack::Hihat),
            Track::Bass | Track::Chords => None,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Track::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown track '{s}'"))
    }
}

/// The three sample-player tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumTrack {
    Kick,
    Snare,
    Hihat,
}

impl DrumTrack {
    pub const ALL: [DrumTrack; 3] = [DrumTrack::Kick, DrumTrack::Snare, DrumTrack::Hihat];

    pub fn track(self) -> Track {
        match self {
            DrumTrack::Kick => Track::Kick,
            DrumTrack::Snare => Track::Snare,
            DrumTrack::Hihat => Track::Hihat,
        }
    }
}

impl fmt::Display for DrumTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.track().name())
    }
}

impl FromStr for DrumTrack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Track>()?
            .as_drum()
            .ok_or_else(|| format!("'{s}' is not a drum track"))
    }
}

/// A value for every track, serialized as a map keyed by track name.
/// Tracks missing from the map take `T::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTrack<T> {
    #[serde(default)]
    pub kick: T,
    #[serde(default)]
    pub snare: T,
    #[serde(default)]
    pub hihat: T,
    #[serde(default)]
    pub bass: T,
    #[serde(default)]
    pub chords: T,
}

impl<T> PerTrack<T> {
    /// Build a table by calling `f` for each track.
    pub fn from_fn(mut f: impl FnMut(Track) -> T) -> Self {
        Self {
            kick: f(Track::Kick),
            snare: f(Track::Snare),
            hihat: f(Track::Hihat),
            bass: f(Track::Bass),
            chords: f(Track::Chords),
        }
    }

    /// Iterate `(track, value)` pairs in mixer order.
    pub fn iter(&self) -> impl Iterator<Item = (Track, &T)> {
        Track::ALL.into_iter().map(move |t| (t, &self[t]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Track, &T) -> U) -> PerTrack<U> {
        PerTrack::from_fn(|t| f(t, &self[t]))
    }
}

impl<T> Index<Track> for PerTrack<T> {
    type Output = T;

    fn index(&self, track: Track) -> &T {
        match track {
            Track::Kick => &self.kick,
            Track::Snare => &self.snare,
            Track::Hihat => &self.hihat,
            Track::Bass => &self.bass,
            Track::Chords => &self.chords,
        }
    }
}

impl<T> IndexMut<Track> for PerTrack<T> {
    fn index_mut(&mut self, track: Track) -> &mut T {
        match track {
            Track::Kick => &mut self.kick,
            Track::Snare => &mut self.snare,
            Track::Hihat => &mut self.hihat,
            Track::Bass => &mut self.bass,
            Track::Chords => &mut self.chords,
        }
    }
}

/// A value for each drum track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDrum<T> {
    #[serde(default)]
    pub kick: T,
    #[serde(default)]
    pub snare: T,
    #[serde(default)]
    pub hihat: T,
}

impl<T> PerDrum<T> {
    pub fn from_fn(mut f: impl FnMut(DrumTrack) -> T) -> Self {
        Self {
            kick: f(DrumTrack::Kick),
            snare: f(DrumTrack::Snare),
            hihat: f(DrumTrack::Hihat),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrumTrack, &T)> {
        DrumTrack::ALL.into_iter().map(move |d| (d, &self[d]))
    }
}

impl<T> Index<DrumTrack> for PerDrum<T> {
    type Output = T;

    fn index(&self, drum: DrumTrack) -> &T {
        match drum {
            DrumTrack::Kick => &self.kick,
            DrumTrack::Snare => &self.snare,
            DrumTrack::Hihat => &self.hihat,
        }
    }
}

impl<T> IndexMut<DrumTrack> for PerDrum<T> {
    fn index_mut(&mut self, drum: DrumTrack) -> &mut T {
        match drum {
            DrumTrack::Kick => &mut self.kick,
            DrumTrack::Snare => &mut self.snare,
            DrumTrack::Hihat => &mut self.hihat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_names_round_trip() {
        for track in Track::ALL {
            assert_eq!(track.name().parse::<Track>().unwrap(), track);
        }
    }

    #[test]
    fn only_sample_tracks_are_drums() {
        assert_eq!(Track::Snare.as_drum(), Some(DrumTrack::Snare));
        assert_eq!(Track::Bass.as_drum(), None);
        assert!("chords".parse::<DrumTrack>().is_err());
    }

    #[test]
    fn per_track_index_matches_fields() {
        let mut table = PerTrack::from_fn(|t| t.name().len());
        assert_eq!(table[Track::Chords], 6);
        table[Track::Bass] = 0;
        assert_eq!(table.bass, 0);
    }

    #[test]
    fn per_track_serializes_as_named_map() {
        let table = PerTrack::from_fn(|t| t == Track::Hihat);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["hihat"], true);
        assert_eq!(json["kick"], false);
    }
}
