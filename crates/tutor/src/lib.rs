pub mod analytics;
pub mod degree;
pub mod interval;
pub mod melody;
pub mod metrics;
pub mod session;

pub use analytics::{accuracy_report, format_percentage, TimingReport};
pub use degree::{DegreeOutcome, DegreeQuestion, ScaleDegreeQuiz};
pub use interval::{AnswerOutcome, IntervalFeedback, IntervalQuestion, IntervalQuiz};
pub use melody::{GuessReport, GuessState, MelodyExercise, SlotResult};
pub use metrics::{classify, rolling_average, CellSummary, SpeedTier};
pub use session::TrainerSession;
