pub mod backend;
pub mod plan;

pub use backend::{AudioBackend, NullBackend, RecordingBackend, ScheduledNote};
pub use plan::{degree_prompt, Accompaniment, BeatEvent, PlaybackPlan};
