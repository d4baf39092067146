//! The "guess the melody and progression" exercise: a random walk over the
//! enabled scale degrees, a four-chord progression, and the listener's
//! per-slot guesses.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use solfa_domain::catalog::{self, TONIC_CHORD};
use solfa_domain::sequence::MELODY_OCTAVES;
use solfa_domain::{
    DomainError, EnabledSet, MelodyNote, MelodySequence, Progression, CHORDS, MELODY_LENGTH,
    PROGRESSION_LENGTH, SCALE_DEGREES,
};

const JUMPS: [i32; 8] = [-4, -3, -2, -1, 1, 2, 3, 4];
const START_OCTAVE: i32 = 4;

/// Walks the enabled degrees in steps of at most four positions. Wrapping
/// off either end of the list moves the octave, which stays within
/// [`MELODY_OCTAVES`].
pub fn generate_melody<R: Rng + ?Sized>(
    rng: &mut R,
    enabled: &EnabledSet,
) -> Result<MelodySequence, DomainError> {
    let degrees: Vec<usize> = enabled
        .enabled_indices()
        .into_iter()
        .filter(|index| *index < SCALE_DEGREES.len())
        .collect();
    if degrees.is_empty() {
        return Err(DomainError::EmptyEnabledSet("scale degrees"));
    }
    let mut current = rng.gen_range(0..degrees.len());
    let mut octave = START_OCTAVE;
    let mut notes = Vec::with_capacity(MELODY_LENGTH);
    for _ in 0..MELODY_LENGTH {
        let jump = JUMPS[rng.gen_range(0..JUMPS.len())];
        let (next, next_octave) = walk_step(current, jump, degrees.len(), octave);
        notes.push(MelodyNote::new(degrees[next], next_octave)?);
        current = next;
        octave = next_octave;
    }
    MelodySequence::new(notes)
}

/// One move of the walk over `len` enabled degrees. Wrapping past the top
/// raises the octave, wrapping past the bottom lowers it, then the octave is
/// clamped once.
fn walk_step(current: usize, jump: i32, len: usize, octave: i32) -> (usize, i32) {
    let next = (current as i32 + jump).rem_euclid(len as i32) as usize;
    let mut octave = octave;
    if jump > 0 && next < current {
        octave += 1;
    }
    if jump < 0 && next > current {
        octave -= 1;
    }
    let octave = octave.clamp(*MELODY_OCTAVES.start(), *MELODY_OCTAVES.end());
    (next, octave)
}

/// Slot 0 is always the tonic chord; the rest are drawn with replacement
/// from the enabled chords.
pub fn generate_progression<R: Rng + ?Sized>(
    rng: &mut R,
    enabled: &EnabledSet,
) -> Result<Progression, DomainError> {
    let allowed: Vec<usize> = enabled
        .enabled_indices()
        .into_iter()
        .filter(|index| *index < CHORDS.len())
        .collect();
    if allowed.is_empty() {
        return Err(DomainError::EmptyEnabledSet("chords"));
    }
    let mut chords = [TONIC_CHORD; PROGRESSION_LENGTH];
    for slot in chords.iter_mut().skip(1) {
        if let Some(chord) = allowed.choose(rng) {
            *slot = *chord;
        }
    }
    Progression::new(chords)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotResult {
    Unanswered,
    Correct,
    Incorrect,
}

impl SlotResult {
    fn compare(guess: Option<usize>, expected: usize) -> Self {
        match guess {
            None => SlotResult::Unanswered,
            Some(guess) if guess == expected => SlotResult::Correct,
            Some(_) => SlotResult::Incorrect,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GuessReport {
    pub melody: Vec<SlotResult>,
    pub chords: Vec<SlotResult>,
}

impl GuessReport {
    pub fn melody_correct(&self) -> usize {
        count(&self.melody, SlotResult::Correct)
    }

    pub fn chords_correct(&self) -> usize {
        count(&self.chords, SlotResult::Correct)
    }

    pub fn is_perfect(&self) -> bool {
        self.melody_correct() == self.melody.len() && self.chords_correct() == self.chords.len()
    }
}

fn count(slots: &[SlotResult], wanted: SlotResult) -> usize {
    slots.iter().filter(|slot| **slot == wanted).count()
}

/// Per-slot guesses: scale-degree indices for the melody, chord indices for
/// the progression.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GuessState {
    melody: [Option<usize>; MELODY_LENGTH],
    chords: [Option<usize>; PROGRESSION_LENGTH],
}

impl GuessState {
    pub fn melody(&self) -> &[Option<usize>] {
        &self.melody
    }

    pub fn chords(&self) -> &[Option<usize>] {
        &self.chords
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Positional comparison; no partial credit and no reordering.
    pub fn check(&self, melody: &MelodySequence, progression: &Progression) -> GuessReport {
        GuessReport {
            melody: melody
                .notes()
                .iter()
                .zip(self.melody)
                .map(|(note, guess)| SlotResult::compare(guess, note.degree()))
                .collect(),
            chords: progression
                .chords()
                .iter()
                .zip(self.chords)
                .map(|(chord, guess)| SlotResult::compare(guess, *chord))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MelodyExercise {
    enabled_degrees: EnabledSet,
    enabled_chords: EnabledSet,
    melody: MelodySequence,
    progression: Progression,
    guesses: GuessState,
    answers_shown: bool,
}

impl MelodyExercise {
    /// Starts with a fresh melody over the saved progression.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        enabled_degrees: EnabledSet,
        enabled_chords: EnabledSet,
        progression: Progression,
    ) -> Result<Self, DomainError> {
        if enabled_degrees.len() != SCALE_DEGREES.len() || enabled_chords.len() != CHORDS.len() {
            return Err(DomainError::validation(
                "melody exercise masks do not match the catalogs",
            ));
        }
        let melody = generate_melody(rng, &enabled_degrees)?;
        Ok(Self {
            enabled_degrees,
            enabled_chords,
            melody,
            progression,
            guesses: GuessState::default(),
            answers_shown: false,
        })
    }

    pub fn melody(&self) -> &MelodySequence {
        &self.melody
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn guesses(&self) -> &GuessState {
        &self.guesses
    }

    pub fn enabled_degrees(&self) -> &EnabledSet {
        &self.enabled_degrees
    }

    pub fn enabled_chords(&self) -> &EnabledSet {
        &self.enabled_chords
    }

    pub fn answers_shown(&self) -> bool {
        self.answers_shown
    }

    /// Rolls a new melody and progression, clears guesses and hides answers.
    pub fn new_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DomainError> {
        let melody = generate_melody(rng, &self.enabled_degrees)?;
        let progression = generate_progression(rng, &self.enabled_chords)?;
        debug!(
            melody = ?melody.labels(),
            progression = ?progression.names(),
            "new melody round"
        );
        self.melody = melody;
        self.progression = progression;
        self.guesses.clear();
        self.answers_shown = false;
        Ok(())
    }

    pub fn guess_degree(&mut self, slot: usize, label: &str) -> Result<(), DomainError> {
        let degree = catalog::degree_by_label(label)?;
        if !self.enabled_degrees.is_enabled(degree) {
            return Err(DomainError::validation(format!(
                "scale degree {label} is not enabled"
            )));
        }
        *self
            .guesses
            .melody
            .get_mut(slot)
            .ok_or_else(|| DomainError::unknown_index("melody slot", slot))? = Some(degree);
        Ok(())
    }

    pub fn guess_chord(&mut self, slot: usize, chord: usize) -> Result<(), DomainError> {
        catalog::chord(chord)?;
        *self
            .guesses
            .chords
            .get_mut(slot)
            .ok_or_else(|| DomainError::unknown_index("progression slot", slot))? = Some(chord);
        Ok(())
    }

    /// Reveals the answers and reports every slot.
    pub fn check_answers(&mut self) -> GuessReport {
        self.answers_shown = true;
        self.guesses.check(&self.melody, &self.progression)
    }

    pub fn hide_answers(&mut self) {
        self.answers_shown = false;
    }

    /// The report, only while answers are shown.
    pub fn report(&self) -> Option<GuessReport> {
        self.answers_shown
            .then(|| self.guesses.check(&self.melody, &self.progression))
    }

    /// Takes effect from the next round.
    pub fn toggle_degree(&mut self, index: usize) -> Result<bool, DomainError> {
        self.enabled_degrees.toggle(index)
    }

    pub fn toggle_chord(&mut self, index: usize) -> Result<bool, DomainError> {
        self.enabled_chords.toggle(index)
    }
}
