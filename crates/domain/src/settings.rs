//! Persisted user state. Loading is lenient: every field that is missing or
//! malformed falls back to its default on its own, and the rest is kept.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::{CHORDS, INTERVALS, SCALE_DEGREES};
use crate::enabled::EnabledSet;
use crate::pitch::{Note, PitchClass};
use crate::sequence::Progression;
use crate::stats::{AccuracyMatrix, TimingMatrix};
use crate::DomainError;

pub const DEFAULT_BPM: u32 = 120;
pub const MAX_BPM: u32 = 240;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    #[default]
    ScaleDegrees,
    Intervals,
    Melody,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MelodySettings {
    pub selected_key: Note,
    pub bpm: u32,
    pub enabled_degrees: EnabledSet,
    pub enabled_chords: EnabledSet,
    pub progression: Progression,
}

impl MelodySettings {
    pub fn set_bpm(&mut self, bpm: u32) {
        self.bpm = bpm.clamp(1, MAX_BPM);
    }

    fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            selected_key: field(value, "selected_key").unwrap_or(defaults.selected_key),
            bpm: field(value, "bpm")
                .filter(|bpm| (1..=MAX_BPM).contains(bpm))
                .unwrap_or(defaults.bpm),
            enabled_degrees: mask_field(value, "enabled_degrees", SCALE_DEGREES.len())
                .unwrap_or(defaults.enabled_degrees),
            enabled_chords: mask_field(value, "enabled_chords", CHORDS.len())
                .unwrap_or(defaults.enabled_chords),
            progression: field(value, "progression").unwrap_or(defaults.progression),
        }
    }
}

impl Default for MelodySettings {
    fn default() -> Self {
        Self {
            selected_key: Note::new(PitchClass::C, 4),
            bpm: DEFAULT_BPM,
            enabled_degrees: EnabledSet::all(SCALE_DEGREES.len()),
            enabled_chords: EnabledSet::all(CHORDS.len()),
            progression: Progression::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Settings {
    pub exercise: Exercise,
    pub interval_enabled: EnabledSet,
    pub interval_timings: TimingMatrix,
    pub degree_enabled: EnabledSet,
    pub degree_accuracy: AccuracyMatrix,
    pub melody: MelodySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exercise: Exercise::default(),
            interval_enabled: EnabledSet::all(INTERVALS.len()),
            interval_timings: TimingMatrix::new(),
            degree_enabled: EnabledSet::all(SCALE_DEGREES.len()),
            degree_accuracy: AccuracyMatrix::new(),
            melody: MelodySettings::default(),
        }
    }
}

impl Settings {
    /// Never fails; anything unreadable becomes the default.
    pub fn from_json(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "settings are not valid JSON, using defaults");
                return Self::default();
            }
        };
        let defaults = Self::default();
        Self {
            exercise: field(&value, "exercise").unwrap_or(defaults.exercise),
            interval_enabled: mask_field(&value, "interval_enabled", INTERVALS.len())
                .unwrap_or(defaults.interval_enabled),
            interval_timings: field(&value, "interval_timings")
                .unwrap_or(defaults.interval_timings),
            degree_enabled: mask_field(&value, "degree_enabled", SCALE_DEGREES.len())
                .unwrap_or(defaults.degree_enabled),
            degree_accuracy: field(&value, "degree_accuracy")
                .unwrap_or(defaults.degree_accuracy),
            melody: value
                .get("melody")
                .map(MelodySettings::from_value)
                .unwrap_or(defaults.melody),
        }
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| DomainError::Serialization(err.to_string()))
    }
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    let raw = value.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(key, %err, "discarding malformed setting");
            None
        }
    }
}

fn mask_field(value: &Value, key: &str, len: usize) -> Option<EnabledSet> {
    let set: EnabledSet = field(value, key)?;
    if set.len() != len {
        warn!(key, expected = len, found = set.len(), "discarding mask of wrong length");
        return None;
    }
    Some(set)
}
