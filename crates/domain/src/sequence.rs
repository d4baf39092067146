use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::catalog::{ChordQuality, ScaleDegree, CHORDS, SCALE_DEGREES, TONIC_CHORD};
use crate::pitch::{Note, PitchClass};
use crate::DomainError;

pub const MELODY_LENGTH: usize = 12;
pub const PROGRESSION_LENGTH: usize = 4;
pub const MELODY_OCTAVES: RangeInclusive<i32> = 3..=5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MelodyNote {
    degree: usize,
    octave: i32,
}

impl MelodyNote {
    pub fn new(degree: usize, octave: i32) -> Result<Self, DomainError> {
        if degree >= SCALE_DEGREES.len() {
            return Err(DomainError::unknown_index("scale degree", degree));
        }
        if !MELODY_OCTAVES.contains(&octave) {
            return Err(DomainError::validation(format!(
                "melody octave {octave} outside {MELODY_OCTAVES:?}"
            )));
        }
        Ok(Self { degree, octave })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn scale_degree(&self) -> &'static ScaleDegree {
        &SCALE_DEGREES[self.degree]
    }

    pub fn label(&self) -> &'static str {
        self.scale_degree().label
    }

    pub fn note_in(&self, key: PitchClass) -> Note {
        self.scale_degree().in_key(key, self.octave)
    }
}

/// Exactly [`MELODY_LENGTH`] notes, replaced wholesale each round.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MelodySequence {
    notes: Vec<MelodyNote>,
}

impl MelodySequence {
    pub fn new(notes: Vec<MelodyNote>) -> Result<Self, DomainError> {
        if notes.len() != MELODY_LENGTH {
            return Err(DomainError::validation(format!(
                "melody needs {MELODY_LENGTH} notes, got {}",
                notes.len()
            )));
        }
        Ok(Self { notes })
    }

    pub fn notes(&self) -> &[MelodyNote] {
        &self.notes
    }

    pub fn get(&self, slot: usize) -> Option<&MelodyNote> {
        self.notes.get(slot)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.notes.iter().map(MelodyNote::label).collect()
    }
}

/// Four chord-catalog indices, one per measure. The first is always the
/// tonic chord.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Progression {
    chords: [usize; PROGRESSION_LENGTH],
}

impl Progression {
    pub fn new(chords: [usize; PROGRESSION_LENGTH]) -> Result<Self, DomainError> {
        if let Some(&index) = chords.iter().find(|&&index| index >= CHORDS.len()) {
            return Err(DomainError::unknown_index("chord", index));
        }
        if chords[0] != TONIC_CHORD {
            return Err(DomainError::validation(format!(
                "progression must open on chord {TONIC_CHORD}, got {}",
                chords[0]
            )));
        }
        Ok(Self { chords })
    }

    pub fn chords(&self) -> [usize; PROGRESSION_LENGTH] {
        self.chords
    }

    pub fn get(&self, slot: usize) -> Option<usize> {
        self.chords.get(slot).copied()
    }

    pub fn qualities(&self) -> [&'static ChordQuality; PROGRESSION_LENGTH] {
        self.chords.map(|index| &CHORDS[index])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.qualities().iter().map(|chord| chord.name).collect()
    }
}

impl Default for Progression {
    /// I IV V I
    fn default() -> Self {
        Self {
            chords: [0, 3, 4, 0],
        }
    }
}

impl TryFrom<Vec<usize>> for Progression {
    type Error = DomainError;

    fn try_from(chords: Vec<usize>) -> Result<Self, Self::Error> {
        let chords: [usize; PROGRESSION_LENGTH] =
            chords.try_into().map_err(|chords: Vec<usize>| {
                DomainError::validation(format!(
                    "progression needs {PROGRESSION_LENGTH} chords, got {}",
                    chords.len()
                ))
            })?;
        Self::new(chords)
    }
}

impl From<Progression> for Vec<usize> {
    fn from(progression: Progression) -> Self {
        progression.chords.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melody_note_checks_range() {
        assert!(MelodyNote::new(12, 4).is_err());
        assert!(MelodyNote::new(0, 2).is_err());
        assert!(MelodyNote::new(0, 6).is_err());
        let note = MelodyNote::new(4, 5).unwrap();
        assert_eq!(note.label(), "3");
        assert_eq!(note.note_in(PitchClass::A).to_string(), "C#5");
    }

    #[test]
    fn melody_requires_twelve_notes() {
        let note = MelodyNote::new(0, 4).unwrap();
        assert!(MelodySequence::new(vec![note; 11]).is_err());
        let melody = MelodySequence::new(vec![note; 12]).unwrap();
        assert_eq!(melody.labels().len(), 12);
    }

    #[test]
    fn progression_defaults_and_validates() {
        let progression = Progression::default();
        assert_eq!(progression.names(), ["I", "IV", "V", "I"]);
        assert!(Progression::new([0, 7, 0, 0]).is_err());
        assert!(Progression::new([4, 1, 2, 3]).is_err());
        assert!(serde_json::from_str::<Progression>("[3,0,4,0]").is_err());
        assert!(serde_json::from_str::<Progression>("[0,1,2]").is_err());
        let parsed: Progression = serde_json::from_str("[0,5,1,4]").unwrap();
        assert_eq!(parsed.get(1), Some(5));
    }
}
