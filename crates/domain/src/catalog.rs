//! Fixed, ordered tables the quizzes draw from. Entries are referenced by
//! their position, which is also how enabled masks and persisted matrices
//! are keyed.

use serde::Serialize;

use crate::pitch::{Note, PitchClass};
use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct IntervalType {
    pub name: &'static str,
    pub semitones: u8,
}

pub const INTERVALS: [IntervalType; 12] = [
    IntervalType { name: "minor 2nd", semitones: 1 },
    IntervalType { name: "major 2nd", semitones: 2 },
    IntervalType { name: "minor 3rd", semitones: 3 },
    IntervalType { name: "major 3rd", semitones: 4 },
    IntervalType { name: "perfect 4th", semitones: 5 },
    IntervalType { name: "tritone", semitones: 6 },
    IntervalType { name: "perfect 5th", semitones: 7 },
    IntervalType { name: "minor 6th", semitones: 8 },
    IntervalType { name: "major 6th", semitones: 9 },
    IntervalType { name: "minor 7th", semitones: 10 },
    IntervalType { name: "major 7th", semitones: 11 },
    IntervalType { name: "octave", semitones: 12 },
];

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ScaleDegree {
    pub label: &'static str,
    pub semitones: u8,
}

pub const SCALE_DEGREES: [ScaleDegree; 12] = [
    ScaleDegree { label: "1", semitones: 0 },
    ScaleDegree { label: "b2", semitones: 1 },
    ScaleDegree { label: "2", semitones: 2 },
    ScaleDegree { label: "b3", semitones: 3 },
    ScaleDegree { label: "3", semitones: 4 },
    ScaleDegree { label: "4", semitones: 5 },
    ScaleDegree { label: "b5", semitones: 6 },
    ScaleDegree { label: "5", semitones: 7 },
    ScaleDegree { label: "b6", semitones: 8 },
    ScaleDegree { label: "6", semitones: 9 },
    ScaleDegree { label: "b7", semitones: 10 },
    ScaleDegree { label: "7", semitones: 11 },
];

/// Diatonic triad on a major-scale degree. Upper voices keep their stacked
/// offsets (V is `[7, 11, 14]`), so offsets may exceed an octave.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ChordQuality {
    pub name: &'static str,
    pub offsets: [u8; 3],
}

pub const CHORDS: [ChordQuality; 7] = [
    ChordQuality { name: "I", offsets: [0, 4, 7] },
    ChordQuality { name: "ii", offsets: [2, 5, 9] },
    ChordQuality { name: "iii", offsets: [4, 7, 11] },
    ChordQuality { name: "IV", offsets: [5, 9, 12] },
    ChordQuality { name: "V", offsets: [7, 11, 14] },
    ChordQuality { name: "vi", offsets: [9, 12, 16] },
    ChordQuality { name: "vii°", offsets: [11, 14, 17] },
];

pub const TONIC_CHORD: usize = 0;

/// Tonics used for scale-degree prompts: the white keys of octave 2.
pub const TONICS: [Note; 7] = [
    Note { pitch_class: PitchClass::C, octave: 2 },
    Note { pitch_class: PitchClass::D, octave: 2 },
    Note { pitch_class: PitchClass::E, octave: 2 },
    Note { pitch_class: PitchClass::F, octave: 2 },
    Note { pitch_class: PitchClass::G, octave: 2 },
    Note { pitch_class: PitchClass::A, octave: 2 },
    Note { pitch_class: PitchClass::B, octave: 2 },
];

pub fn interval(index: usize) -> Result<&'static IntervalType, DomainError> {
    INTERVALS
        .get(index)
        .ok_or_else(|| DomainError::unknown_index("interval", index))
}

pub fn interval_by_name(name: &str) -> Result<usize, DomainError> {
    INTERVALS
        .iter()
        .position(|interval| interval.name == name)
        .ok_or_else(|| DomainError::validation(format!("unknown interval name {name}")))
}

pub fn scale_degree(index: usize) -> Result<&'static ScaleDegree, DomainError> {
    SCALE_DEGREES
        .get(index)
        .ok_or_else(|| DomainError::unknown_index("scale degree", index))
}

pub fn degree_by_label(label: &str) -> Result<usize, DomainError> {
    SCALE_DEGREES
        .iter()
        .position(|degree| degree.label == label)
        .ok_or_else(|| DomainError::validation(format!("unknown scale degree {label}")))
}

pub fn chord(index: usize) -> Result<&'static ChordQuality, DomainError> {
    CHORDS
        .get(index)
        .ok_or_else(|| DomainError::unknown_index("chord", index))
}

pub fn chord_by_name(name: &str) -> Result<usize, DomainError> {
    CHORDS
        .iter()
        .position(|chord| chord.name == name)
        .ok_or_else(|| DomainError::validation(format!("unknown chord {name}")))
}

impl ScaleDegree {
    /// The degree above `tonic`, carrying into the next octave when needed.
    pub fn above(&self, tonic: Note) -> Note {
        tonic.offset(self.semitones as i32)
    }

    /// The degree in `key`, pinned to `octave` with no carry.
    pub fn in_key(&self, key: PitchClass, octave: i32) -> Note {
        Note::new(
            PitchClass::wrapping(key.index() as i32 + self.semitones as i32),
            octave,
        )
    }
}

impl ChordQuality {
    /// Voices the chord over `key` rooted in `octave`: each offset carries
    /// into higher octaves, and every voice above the root is lifted one
    /// further octave.
    pub fn voicing(&self, key: PitchClass, octave: i32) -> [Note; 3] {
        let root = Note::new(key, octave);
        let mut notes = [root; 3];
        for (voice, offset) in self.offsets.iter().enumerate() {
            let lift = if voice > 0 { 12 } else { 0 };
            notes[voice] = root.offset(*offset as i32 + lift);
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_have_fixed_shapes() {
        assert_eq!(INTERVALS.len(), 12);
        assert!(INTERVALS.iter().all(|i| (1..=12).contains(&i.semitones)));
        assert_eq!(SCALE_DEGREES[6].label, "b5");
        assert_eq!(CHORDS[4].offsets, [7, 11, 14]);
        let tonics: Vec<String> = TONICS.iter().map(|n| n.to_string()).collect();
        assert_eq!(tonics, ["C2", "D2", "E2", "F2", "G2", "A2", "B2"]);
    }

    #[test]
    fn lookups_fail_outside_the_catalog() {
        assert_eq!(interval(0).unwrap().name, "minor 2nd");
        assert_eq!(
            interval(12),
            Err(DomainError::unknown_index("interval", 12))
        );
        assert!(chord(7).is_err());
        assert_eq!(degree_by_label("b7").unwrap(), 10);
        assert!(degree_by_label("#4").is_err());
        assert_eq!(interval_by_name("tritone").unwrap(), 5);
        assert_eq!(chord_by_name("vi").unwrap(), 5);
        assert!(chord_by_name("VI").is_err());
    }

    #[test]
    fn degree_above_tonic_carries_octave() {
        let b2 = TONICS[6];
        let fifth = SCALE_DEGREES[7].above(b2);
        assert_eq!(fifth.to_string(), "F#3");
        let pinned = SCALE_DEGREES[7].in_key(PitchClass::wrapping(11), 4);
        assert_eq!(pinned.to_string(), "F#4");
    }

    #[test]
    fn dominant_voicing_keeps_upper_octave() {
        let notes = CHORDS[4].voicing(PitchClass::C, 2);
        let names: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["G2", "B3", "D4"]);
    }
}
