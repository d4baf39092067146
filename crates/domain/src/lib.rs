pub mod catalog;
pub mod enabled;
pub mod error;
pub mod pitch;
pub mod sequence;
pub mod settings;
pub mod stats;

pub use crate::catalog::{
    ChordQuality, IntervalType, ScaleDegree, CHORDS, INTERVALS, SCALE_DEGREES, TONICS,
};
pub use crate::enabled::EnabledSet;
pub use crate::error::DomainError;
pub use crate::pitch::{Direction, Note, PitchClass};
pub use crate::sequence::{
    MelodyNote, MelodySequence, Progression, MELODY_LENGTH, PROGRESSION_LENGTH,
};
pub use crate::settings::{Exercise, MelodySettings, Settings};
pub use crate::stats::{AccuracyMatrix, AccuracyTally, TimingMatrix};
