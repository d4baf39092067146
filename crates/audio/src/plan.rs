//! Turns a melody exercise into timed notes. Measures are four beats long:
//! each measure sounds one progression chord, and melody notes fall on
//! beats 1 and 3 (counting from 0).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{debug, instrument};

use solfa_domain::{
    DomainError, MelodySequence, Note, PitchClass, Progression, MELODY_LENGTH, PROGRESSION_LENGTH,
};

use crate::backend::{AudioBackend, ScheduledNote};

pub const BEATS_PER_MEASURE: usize = 4;
pub const ACCOMPANIMENT_OCTAVE: i32 = 2;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Accompaniment {
    /// Chord tones one after another, a twelfth-note apart.
    #[default]
    Arpeggio,
    /// Chord tones together.
    Harmonic,
    /// A sustained tonic and no chords.
    TonicDrone,
}

/// What happens when the transport reaches one beat.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BeatEvent {
    pub beat: usize,
    pub chord_slot: usize,
    pub melody_slot: Option<usize>,
    pub notes: Vec<ScheduledNote>,
}

#[derive(Clone, Debug)]
pub struct PlaybackPlan {
    key: PitchClass,
    bpm: u32,
    melody: MelodySequence,
    progression: Progression,
    accompaniment: Accompaniment,
}

impl PlaybackPlan {
    pub fn new(
        key: Note,
        bpm: u32,
        melody: MelodySequence,
        progression: Progression,
        accompaniment: Accompaniment,
    ) -> Result<Self, DomainError> {
        if bpm == 0 {
            return Err(DomainError::validation("tempo must be above zero"));
        }
        Ok(Self {
            key: key.pitch_class,
            bpm,
            melody,
            progression,
            accompaniment,
        })
    }

    pub fn beat_seconds(&self) -> f64 {
        60.0 / self.bpm as f64
    }

    /// Beats until melody and progression line up again.
    pub fn cycle_beats(&self) -> usize {
        let melody_measures = MELODY_LENGTH / 2;
        lcm(melody_measures, PROGRESSION_LENGTH) * BEATS_PER_MEASURE
    }

    pub fn drone(&self) -> Option<Note> {
        (self.accompaniment == Accompaniment::TonicDrone)
            .then(|| Note::new(self.key, ACCOMPANIMENT_OCTAVE))
    }

    pub fn beat(&self, beat: usize) -> BeatEvent {
        let measure = beat / BEATS_PER_MEASURE;
        let beat_in_measure = beat % BEATS_PER_MEASURE;
        let chord_slot = measure % PROGRESSION_LENGTH;
        let at = self.seconds(beat as f64);
        let mut notes = Vec::new();

        if beat_in_measure == 0 {
            notes.extend(self.chord(chord_slot, at));
        }

        let melody_slot = match beat_in_measure {
            1 | 3 => Some((measure * 2 + beat_in_measure / 2) % MELODY_LENGTH),
            _ => None,
        };
        if let Some(slot) = melody_slot {
            if let Some(note) = self.melody.get(slot) {
                notes.push(ScheduledNote::new(
                    vec![note.note_in(self.key)],
                    at,
                    self.fifth_note(),
                ));
            }
        }

        BeatEvent {
            beat,
            chord_slot,
            melody_slot,
            notes,
        }
    }

    /// Sends `beats` beats of the plan to `backend`.
    #[instrument(skip(self, backend))]
    pub fn render<B: AudioBackend + ?Sized>(&self, backend: &mut B, beats: usize) -> Result<()> {
        if let Some(drone) = self.drone() {
            backend.hold(drone)?;
        }
        for beat in 0..beats {
            let event = self.beat(beat);
            debug!(beat, chord_slot = event.chord_slot, melody_slot = ?event.melody_slot, "beat");
            for note in &event.notes {
                backend.play(note)?;
            }
        }
        Ok(())
    }

    fn chord(&self, slot: usize, at: Duration) -> Vec<ScheduledNote> {
        let quality = self.progression.qualities()[slot];
        let voicing = quality.voicing(self.key, ACCOMPANIMENT_OCTAVE);
        match self.accompaniment {
            Accompaniment::Arpeggio => {
                let step = self.seconds(BEATS_PER_MEASURE as f64 / 12.0);
                voicing
                    .iter()
                    .enumerate()
                    .map(|(voice, note)| {
                        ScheduledNote::new(vec![*note], at + step * voice as u32, step)
                    })
                    .collect()
            }
            Accompaniment::Harmonic => {
                vec![ScheduledNote::new(voicing.to_vec(), at, self.fifth_note())]
            }
            Accompaniment::TonicDrone => Vec::new(),
        }
    }

    /// A fifth of a whole note.
    fn fifth_note(&self) -> Duration {
        self.seconds(BEATS_PER_MEASURE as f64 / 5.0)
    }

    fn seconds(&self, beats: f64) -> Duration {
        Duration::seconds_f64(beats * self.beat_seconds())
    }
}

/// The scale-degree prompt: the tonic rings for ten seconds and the degree
/// enters three seconds in, ringing for seven.
pub fn degree_prompt(tonic: Note, target: Note) -> [ScheduledNote; 2] {
    [
        ScheduledNote::new(vec![tonic], Duration::ZERO, Duration::seconds(10)),
        ScheduledNote::new(vec![target], Duration::seconds(3), Duration::seconds(7)),
    ]
}

fn lcm(a: usize, b: usize) -> usize {
    fn gcd(a: usize, b: usize) -> usize {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }
    a / gcd(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use approx::assert_relative_eq;
    use solfa_domain::MelodyNote;

    fn plan(accompaniment: Accompaniment) -> PlaybackPlan {
        let notes = (0..MELODY_LENGTH)
            .map(|slot| MelodyNote::new(slot, 4).unwrap())
            .collect();
        PlaybackPlan::new(
            "D4".parse().unwrap(),
            120,
            MelodySequence::new(notes).unwrap(),
            Progression::default(),
            accompaniment,
        )
        .unwrap()
    }

    #[test]
    fn melody_lands_on_beats_one_and_three() {
        let plan = plan(Accompaniment::Arpeggio);
        let slots: Vec<Option<usize>> = (0..8).map(|beat| plan.beat(beat).melody_slot).collect();
        assert_eq!(
            slots,
            [None, Some(0), None, Some(1), None, Some(2), None, Some(3)]
        );
        assert_eq!(plan.beat(4 * 6 + 1).melody_slot, Some(0));
        let note = &plan.beat(3).notes[0];
        assert_eq!(note.notes[0].to_string(), "D#4");
        assert_relative_eq!(note.at.as_seconds_f64(), 1.5);
    }

    #[test]
    fn chords_change_each_measure() {
        let plan = plan(Accompaniment::Harmonic);
        let chord_slots: Vec<usize> = (0..20)
            .step_by(4)
            .map(|beat| plan.beat(beat).chord_slot)
            .collect();
        assert_eq!(chord_slots, [0, 1, 2, 3, 0]);
        let fourth = plan.beat(4);
        let names: Vec<String> = fourth.notes[0].notes.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["G2", "B3", "D4"]);
        assert_relative_eq!(fourth.notes[0].length.as_seconds_f64(), 0.4);
    }

    #[test]
    fn arpeggio_staggers_voices() {
        let plan = plan(Accompaniment::Arpeggio);
        let downbeat = plan.beat(0);
        assert_eq!(downbeat.notes.len(), 3);
        assert_relative_eq!(downbeat.notes[1].at.as_seconds_f64(), 1.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(downbeat.notes[2].at.as_seconds_f64(), 2.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn drone_replaces_chords() {
        let plan = plan(Accompaniment::TonicDrone);
        assert_eq!(plan.drone().unwrap().to_string(), "D2");
        assert!(plan.beat(0).notes.is_empty());
        let mut backend = RecordingBackend::default();
        plan.render(&mut backend, plan.cycle_beats()).unwrap();
        assert_eq!(backend.held.len(), 1);
        assert_eq!(backend.played.len(), 24);
    }

    #[test]
    fn cycle_covers_melody_and_progression() {
        assert_eq!(plan(Accompaniment::Arpeggio).cycle_beats(), 48);
    }

    #[test]
    fn zero_tempo_is_rejected() {
        let notes = vec![MelodyNote::new(0, 4).unwrap(); MELODY_LENGTH];
        let result = PlaybackPlan::new(
            "C4".parse().unwrap(),
            0,
            MelodySequence::new(notes).unwrap(),
            Progression::default(),
            Accompaniment::Arpeggio,
        );
        assert!(result.is_err());
    }

    #[test]
    fn prompt_overlaps_tonic_and_degree() {
        let [tonic, degree] = degree_prompt("C2".parse().unwrap(), "G2".parse().unwrap());
        assert_eq!(tonic.length, Duration::seconds(10));
        assert_eq!(degree.at, Duration::seconds(3));
    }
}
