use rand::Rng;
use tracing::info;

use solfa_domain::settings::MAX_BPM;
use solfa_domain::{DomainError, Exercise, MelodySettings, Note, Settings};

use crate::degree::ScaleDegreeQuiz;
use crate::interval::IntervalQuiz;
use crate::melody::MelodyExercise;

/// Everything one user is working on. All mutation goes through `&mut self`,
/// so a host that shares a session across threads wraps the whole value in
/// one lock.
#[derive(Debug, Clone)]
pub struct TrainerSession {
    exercise: Exercise,
    intervals: IntervalQuiz,
    degrees: ScaleDegreeQuiz,
    melody: MelodyExercise,
    selected_key: Note,
    bpm: u32,
}

impl TrainerSession {
    pub fn from_settings<R: Rng + ?Sized>(
        settings: Settings,
        rng: &mut R,
    ) -> Result<Self, DomainError> {
        let Settings {
            exercise,
            interval_enabled,
            interval_timings,
            degree_enabled,
            degree_accuracy,
            melody,
        } = settings;
        let MelodySettings {
            selected_key,
            bpm,
            enabled_degrees,
            enabled_chords,
            progression,
        } = melody;
        info!(?exercise, %selected_key, bpm, "starting session");
        Ok(Self {
            exercise,
            intervals: IntervalQuiz::new(interval_enabled, interval_timings)?,
            degrees: ScaleDegreeQuiz::new(degree_enabled, degree_accuracy)?,
            melody: MelodyExercise::new(rng, enabled_degrees, enabled_chords, progression)?,
            selected_key,
            bpm,
        })
    }

    /// Snapshot of everything that is persisted between sessions.
    pub fn settings(&self) -> Settings {
        Settings {
            exercise: self.exercise,
            interval_enabled: self.intervals.enabled().clone(),
            interval_timings: self.intervals.timings().clone(),
            degree_enabled: self.degrees.enabled().clone(),
            degree_accuracy: self.degrees.accuracy().clone(),
            melody: MelodySettings {
                selected_key: self.selected_key,
                bpm: self.bpm,
                enabled_degrees: self.melody.enabled_degrees().clone(),
                enabled_chords: self.melody.enabled_chords().clone(),
                progression: *self.melody.progression(),
            },
        }
    }

    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn set_exercise(&mut self, exercise: Exercise) {
        self.exercise = exercise;
    }

    pub fn selected_key(&self) -> Note {
        self.selected_key
    }

    pub fn set_selected_key(&mut self, key: Note) {
        self.selected_key = key;
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.bpm = bpm.clamp(1, MAX_BPM);
    }

    pub fn intervals(&self) -> &IntervalQuiz {
        &self.intervals
    }

    pub fn intervals_mut(&mut self) -> &mut IntervalQuiz {
        &mut self.intervals
    }

    pub fn degrees(&self) -> &ScaleDegreeQuiz {
        &self.degrees
    }

    pub fn degrees_mut(&mut self) -> &mut ScaleDegreeQuiz {
        &mut self.degrees
    }

    pub fn melody(&self) -> &MelodyExercise {
        &self.melody
    }

    pub fn melody_mut(&mut self) -> &mut MelodyExercise {
        &mut self.melody
    }
}
