use anyhow::Result;
use serde::Serialize;
use time::Duration;
use tracing::debug;

use solfa_domain::Note;

/// Notes that start together at `at` (from the start of playback) and ring
/// for `length`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScheduledNote {
    pub notes: Vec<Note>,
    pub at: Duration,
    pub length: Duration,
}

impl ScheduledNote {
    pub fn new(notes: Vec<Note>, at: Duration, length: Duration) -> Self {
        Self { notes, at, length }
    }
}

/// Whatever actually makes sound. Synthesis is up to the implementation.
pub trait AudioBackend {
    fn play(&mut self, event: &ScheduledNote) -> Result<()>;

    /// Starts a note that rings until [`AudioBackend::release_all`].
    fn hold(&mut self, note: Note) -> Result<()>;

    fn release_all(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play(&mut self, event: &ScheduledNote) -> Result<()> {
        debug!(?event, "null backend play");
        Ok(())
    }

    fn hold(&mut self, note: Note) -> Result<()> {
        debug!(%note, "null backend hold");
        Ok(())
    }
}

/// Keeps everything it is asked to play, for inspection.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub played: Vec<ScheduledNote>,
    pub held: Vec<Note>,
}

impl AudioBackend for RecordingBackend {
    fn play(&mut self, event: &ScheduledNote) -> Result<()> {
        self.played.push(event.clone());
        Ok(())
    }

    fn hold(&mut self, note: Note) -> Result<()> {
        self.held.push(note);
        Ok(())
    }

    fn release_all(&mut self) -> Result<()> {
        self.held.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solfa_domain::PitchClass;

    #[test]
    fn recording_backend_keeps_events() {
        let mut backend = RecordingBackend::default();
        let a4 = Note::new(PitchClass::A, 4);
        let event = ScheduledNote::new(vec![a4], Duration::ZERO, Duration::seconds(1));
        backend.play(&event).unwrap();
        backend.hold(a4).unwrap();
        assert_eq!(backend.played, vec![event]);
        backend.release_all().unwrap();
        assert!(backend.held.is_empty());
    }

    #[test]
    fn null_backend_accepts_everything() {
        let mut backend = NullBackend;
        let event = ScheduledNote::new(Vec::new(), Duration::ZERO, Duration::ZERO);
        assert!(backend.play(&event).is_ok());
        assert!(backend.release_all().is_ok());
    }
}
