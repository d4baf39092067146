use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use solfa_domain::catalog::{self, IntervalType, INTERVALS};
use solfa_domain::pitch::PITCH_CLASS_COUNT;
use solfa_domain::{Direction, DomainError, EnabledSet, PitchClass, TimingMatrix};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IntervalQuestion {
    start: PitchClass,
    interval: usize,
    direction: Direction,
    answer: PitchClass,
}

impl IntervalQuestion {
    pub fn new(
        start: PitchClass,
        interval: usize,
        direction: Direction,
    ) -> Result<Self, DomainError> {
        let semitones = catalog::interval(interval)?.semitones;
        Ok(Self {
            start,
            interval,
            direction,
            answer: start.transpose(semitones, direction),
        })
    }

    pub fn start(&self) -> PitchClass {
        self.start
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn interval_type(&self) -> &'static IntervalType {
        &INTERVALS[self.interval]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn answer(&self) -> PitchClass {
        self.answer
    }

    /// e.g. `C ascending minor 2nd`
    pub fn prompt(&self) -> String {
        format!(
            "{} {} {}",
            self.start,
            self.direction,
            self.interval_type().name
        )
    }

    pub fn evaluate(&self, chosen: PitchClass) -> AnswerOutcome {
        AnswerOutcome {
            correct: chosen == self.answer,
            correct_answer: self.answer,
        }
    }
}

/// Draws an enabled interval, a start note and a direction uniformly.
pub fn generate_question<R: Rng + ?Sized>(
    rng: &mut R,
    enabled: &EnabledSet,
) -> Result<IntervalQuestion, DomainError> {
    let candidates: Vec<usize> = enabled
        .enabled_indices()
        .into_iter()
        .filter(|index| *index < INTERVALS.len())
        .collect();
    let interval = *candidates
        .choose(rng)
        .ok_or(DomainError::EmptyEnabledSet("intervals"))?;
    let start = PitchClass::wrapping(rng.gen_range(0..PITCH_CLASS_COUNT as i32));
    let direction = if rng.gen_bool(0.5) {
        Direction::Ascending
    } else {
        Direction::Descending
    };
    IntervalQuestion::new(start, interval, direction)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: PitchClass,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntervalFeedback {
    Idle,
    AwaitingAnswer,
    /// The caller advances with [`IntervalQuiz::next`] after a short pause.
    Correct,
    /// The answer must be acknowledged with [`IntervalQuiz::next`].
    Incorrect { correct_answer: PitchClass },
}

#[derive(Debug, Clone)]
pub struct IntervalQuiz {
    enabled: EnabledSet,
    timings: TimingMatrix,
    question: Option<IntervalQuestion>,
    feedback: IntervalFeedback,
}

impl IntervalQuiz {
    pub fn new(enabled: EnabledSet, timings: TimingMatrix) -> Result<Self, DomainError> {
        if enabled.len() != INTERVALS.len() {
            return Err(DomainError::validation(format!(
                "interval mask needs {} entries, got {}",
                INTERVALS.len(),
                enabled.len()
            )));
        }
        Ok(Self {
            enabled,
            timings,
            question: None,
            feedback: IntervalFeedback::Idle,
        })
    }

    pub fn enabled(&self) -> &EnabledSet {
        &self.enabled
    }

    pub fn timings(&self) -> &TimingMatrix {
        &self.timings
    }

    pub fn question(&self) -> Option<&IntervalQuestion> {
        self.question.as_ref()
    }

    pub fn feedback(&self) -> IntervalFeedback {
        self.feedback
    }

    /// Replaces the current question, whatever state the round is in.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&IntervalQuestion, DomainError> {
        let question = generate_question(rng, &self.enabled)?;
        debug!(prompt = %question.prompt(), "new interval question");
        self.feedback = IntervalFeedback::AwaitingAnswer;
        Ok(&*self.question.insert(question))
    }

    /// Installs a specific question. Its interval must be enabled.
    pub fn ask(&mut self, question: IntervalQuestion) -> Result<&IntervalQuestion, DomainError> {
        if !self.enabled.is_enabled(question.interval) {
            return Err(DomainError::validation(format!(
                "interval {} is not enabled",
                question.interval_type().name
            )));
        }
        self.feedback = IntervalFeedback::AwaitingAnswer;
        Ok(&*self.question.insert(question))
    }

    /// Resolves the outstanding question. Returns `None` when nothing is
    /// awaiting an answer, so repeated or stale answers change nothing.
    pub fn submit_answer(
        &mut self,
        chosen: PitchClass,
        elapsed_seconds: f64,
    ) -> Option<AnswerOutcome> {
        if self.feedback != IntervalFeedback::AwaitingAnswer {
            return None;
        }
        let question = self.question?;
        let outcome = question.evaluate(chosen);
        if outcome.correct {
            if let Err(err) = self.timings.record(
                question.start,
                question.interval,
                question.direction,
                elapsed_seconds,
            ) {
                warn!(%err, "could not record interval timing");
            }
            self.feedback = IntervalFeedback::Correct;
        } else {
            self.feedback = IntervalFeedback::Incorrect {
                correct_answer: outcome.correct_answer,
            };
        }
        debug!(correct = outcome.correct, elapsed_seconds, "interval answered");
        Some(outcome)
    }

    /// Toggles an interval. An accepted toggle discards the current question
    /// and installs a fresh one drawn from the new set.
    pub fn toggle<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Result<bool, DomainError> {
        if !self.enabled.toggle(index)? {
            return Ok(false);
        }
        self.next(rng)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiz_with(indices: &[usize]) -> IntervalQuiz {
        let enabled = EnabledSet::only(INTERVALS.len(), indices).unwrap();
        IntervalQuiz::new(enabled, TimingMatrix::new()).unwrap()
    }

    #[test]
    fn generated_answers_sit_the_interval_away() {
        let mut rng = Pcg32::seed_from_u64(7);
        let enabled = EnabledSet::all(INTERVALS.len());
        for _ in 0..500 {
            let question = generate_question(&mut rng, &enabled).unwrap();
            let size = question.interval_type().semitones % 12;
            assert_eq!(
                question.start().distance_to(question.answer(), question.direction()),
                size
            );
        }
    }

    #[test]
    fn generation_only_uses_enabled_intervals() {
        let mut rng = Pcg32::seed_from_u64(11);
        let enabled = EnabledSet::only(INTERVALS.len(), &[2, 9]).unwrap();
        for _ in 0..200 {
            let question = generate_question(&mut rng, &enabled).unwrap();
            assert!(matches!(question.interval(), 2 | 9));
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let enabled = EnabledSet::all(INTERVALS.len());
        let first = generate_question(&mut Pcg32::seed_from_u64(3), &enabled).unwrap();
        let second = generate_question(&mut Pcg32::seed_from_u64(3), &enabled).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn correct_answer_records_timing_once() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut quiz = quiz_with(&[6]);
        let question = *quiz.next(&mut rng).unwrap();
        let outcome = quiz.submit_answer(question.answer(), 2.0).unwrap();
        assert!(outcome.correct);
        assert_eq!(quiz.feedback(), IntervalFeedback::Correct);
        assert_eq!(
            quiz.timings()
                .samples(question.start(), 6, question.direction()),
            &[2.0]
        );
        assert!(quiz.submit_answer(question.answer(), 1.0).is_none());
        assert_eq!(quiz.timings().sample_count(), 1);
    }

    #[test]
    fn wrong_answer_waits_for_next() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut quiz = quiz_with(&[0]);
        let question = *quiz.next(&mut rng).unwrap();
        let wrong = question.answer().transpose(1, Direction::Ascending);
        let outcome = quiz.submit_answer(wrong, 4.0).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, question.answer());
        assert_eq!(
            quiz.feedback(),
            IntervalFeedback::Incorrect {
                correct_answer: question.answer()
            }
        );
        assert!(quiz.submit_answer(question.answer(), 1.0).is_none());
        assert_eq!(quiz.timings().sample_count(), 0);
        quiz.next(&mut rng).unwrap();
        assert_eq!(quiz.feedback(), IntervalFeedback::AwaitingAnswer);
    }

    #[test]
    fn answer_before_start_is_ignored() {
        let mut quiz = quiz_with(&[0]);
        assert_eq!(quiz.feedback(), IntervalFeedback::Idle);
        assert!(quiz.submit_answer(PitchClass::C, 1.0).is_none());
    }

    #[test]
    fn toggle_regenerates_from_new_set() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut quiz = quiz_with(&[0, 1]);
        quiz.next(&mut rng).unwrap();
        quiz.submit_answer(PitchClass::C, 1.0);
        assert!(quiz.toggle(0, &mut rng).unwrap());
        assert_eq!(quiz.question().unwrap().interval(), 1);
        assert_eq!(quiz.feedback(), IntervalFeedback::AwaitingAnswer);

        let before = *quiz.question().unwrap();
        assert!(!quiz.toggle(1, &mut rng).unwrap());
        assert_eq!(quiz.question(), Some(&before));
        assert_eq!(quiz.enabled().enabled_indices(), vec![1]);
    }

    #[test]
    fn ask_requires_an_enabled_interval() {
        let mut quiz = quiz_with(&[0]);
        let tritone = IntervalQuestion::new(PitchClass::C, 5, Direction::Ascending).unwrap();
        assert!(quiz.ask(tritone).is_err());
        let second = IntervalQuestion::new(PitchClass::B, 0, Direction::Ascending).unwrap();
        assert_eq!(quiz.ask(second).unwrap().answer(), PitchClass::C);
        assert_eq!(quiz.feedback(), IntervalFeedback::AwaitingAnswer);
    }

    #[test]
    fn rejects_mask_of_wrong_size() {
        assert!(IntervalQuiz::new(EnabledSet::all(3), TimingMatrix::new()).is_err());
    }
}
