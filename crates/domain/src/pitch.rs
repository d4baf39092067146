use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const PITCH_CLASS_COUNT: usize = 12;

/// Sharp spellings, used for answers and absolute note names.
pub const SHARP_NAMES: [&str; PITCH_CLASS_COUNT] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Labels shown on answer buttons, with both enharmonic spellings.
pub const DISPLAY_NAMES: [&str; PITCH_CLASS_COUNT] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Ascending => "↑",
            Direction::Descending => "↓",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => f.write_str("ascending"),
            Direction::Descending => f.write_str("descending"),
        }
    }
}

/// One of the twelve equal-tempered pitch classes. Always in `0..12`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const D: PitchClass = PitchClass(2);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);
    pub const B: PitchClass = PitchClass(11);

    /// Reduces any signed semitone count into a pitch class.
    pub fn wrapping(semitones: i32) -> Self {
        Self(semitones.rem_euclid(PITCH_CLASS_COUNT as i32) as u8)
    }

    pub fn from_index(index: usize) -> Result<Self, DomainError> {
        if index < PITCH_CLASS_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(DomainError::unknown_index("pitch class", index))
        }
    }

    /// Accepts a sharp name (`C#`), a display label (`C#/Db`) or either half of one (`Db`).
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        SHARP_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .or_else(|| {
                DISPLAY_NAMES.iter().position(|label| {
                    *label == name || label.split('/').any(|part| part == name)
                })
            })
            .map(|index| Self(index as u8))
            .ok_or_else(|| DomainError::UnknownPitchName(name.to_string()))
    }

    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..PITCH_CLASS_COUNT as u8).map(PitchClass)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.index()]
    }

    pub fn display_name(self) -> &'static str {
        DISPLAY_NAMES[self.index()]
    }

    pub fn is_accidental(self) -> bool {
        self.name().ends_with('#')
    }

    pub fn transpose(self, semitones: u8, direction: Direction) -> Self {
        Self::wrapping(self.0 as i32 + direction.sign() * semitones as i32)
    }

    /// Semitones travelled from `self` to `other` in `direction`, in `0..12`.
    pub fn distance_to(self, other: PitchClass, direction: Direction) -> u8 {
        let delta = (other.0 as i32 - self.0 as i32) * direction.sign();
        delta.rem_euclid(PITCH_CLASS_COUNT as i32) as u8
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize)
    }
}

impl From<PitchClass> for u8 {
    fn from(value: PitchClass) -> Self {
        value.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn pitch_class_index(name: &str) -> Result<usize, DomainError> {
    PitchClass::from_name(name).map(PitchClass::index)
}

pub fn name_of(index: usize) -> Result<&'static str, DomainError> {
    PitchClass::from_index(index).map(PitchClass::name)
}

/// A pitch class placed in an octave, written in scientific pitch notation (`C#4`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: i32) -> Self {
        Self {
            pitch_class,
            octave,
        }
    }

    /// Semitones above C0.
    pub fn absolute(self) -> i32 {
        self.octave * PITCH_CLASS_COUNT as i32 + self.pitch_class.0 as i32
    }

    pub fn from_absolute(semitones: i32) -> Self {
        Self {
            pitch_class: PitchClass::wrapping(semitones),
            octave: semitones.div_euclid(PITCH_CLASS_COUNT as i32),
        }
    }

    /// Moves the note, carrying the octave across every 12-semitone wrap.
    pub fn transpose(self, semitones: u8, direction: Direction) -> Self {
        self.offset(direction.sign() * semitones as i32)
    }

    pub fn offset(self, semitones: i32) -> Self {
        Self::from_absolute(self.absolute() + semitones)
    }
}

pub fn transpose(note: Note, semitones: u8, direction: Direction) -> Note {
    note.transpose(semitones, direction)
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class.name(), self.octave)
    }
}

impl FromStr for Note {
    type Err = DomainError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| DomainError::UnknownPitchName(text.to_string()))?;
        let (name, octave) = text.split_at(split);
        let pitch_class = PitchClass::from_name(name)?;
        let octave = octave
            .parse::<i32>()
            .map_err(|_| DomainError::UnknownPitchName(text.to_string()))?;
        Ok(Self::new(pitch_class, octave))
    }
}

impl TryFrom<String> for Note {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(value: Note) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_round_trips_for_every_class_and_size() {
        for pitch in PitchClass::all() {
            for semitones in 0..=12u8 {
                let up = pitch.transpose(semitones, Direction::Ascending);
                assert_eq!(up.transpose(semitones, Direction::Descending), pitch);
            }
        }
    }

    #[test]
    fn pitch_class_wraps_without_going_negative() {
        let c = PitchClass::C;
        assert_eq!(c.transpose(1, Direction::Descending).name(), "B");
        assert_eq!(c.transpose(12, Direction::Ascending), c);
        assert_eq!(PitchClass::wrapping(-13).name(), "B");
    }

    #[test]
    fn distance_matches_transpose() {
        let e = PitchClass::from_name("E").unwrap();
        let answer = e.transpose(7, Direction::Descending);
        assert_eq!(answer.name(), "A");
        assert_eq!(e.distance_to(answer, Direction::Descending), 7);
    }

    #[test]
    fn name_lookup_accepts_both_spellings() {
        assert_eq!(pitch_class_index("C#").unwrap(), 1);
        assert_eq!(pitch_class_index("Db").unwrap(), 1);
        assert_eq!(pitch_class_index("A#/Bb").unwrap(), 10);
        assert_eq!(
            pitch_class_index("H"),
            Err(DomainError::UnknownPitchName("H".into()))
        );
        assert_eq!(name_of(11).unwrap(), "B");
        assert!(name_of(12).is_err());
    }

    #[test]
    fn note_transpose_tracks_octave() {
        let b3: Note = "B3".parse().unwrap();
        assert_eq!(b3.transpose(1, Direction::Ascending).to_string(), "C4");
        let c4 = Note::new(PitchClass::C, 4);
        assert_eq!(c4.transpose(1, Direction::Descending).to_string(), "B3");
        assert_eq!(c4.transpose(12, Direction::Ascending).to_string(), "C5");
        assert_eq!(transpose(c4, 25, Direction::Descending).to_string(), "B1");
    }

    #[test]
    fn note_parses_and_serializes_as_text() {
        let note: Note = "F#2".parse().unwrap();
        assert_eq!(note.pitch_class.index(), 6);
        assert_eq!(note.octave, 2);
        assert!("X4".parse::<Note>().is_err());
        assert!("C".parse::<Note>().is_err());
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, "\"F#2\"");
        let back: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }
}
