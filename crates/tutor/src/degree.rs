use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use solfa_domain::catalog::{self, ScaleDegree, SCALE_DEGREES, TONICS};
use solfa_domain::{AccuracyMatrix, DomainError, EnabledSet, Note};

/// A tonic followed by one scale degree above it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DegreeQuestion {
    tonic: Note,
    degree: usize,
}

impl DegreeQuestion {
    pub fn new(tonic: Note, degree: usize) -> Result<Self, DomainError> {
        catalog::scale_degree(degree)?;
        Ok(Self { tonic, degree })
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn scale_degree(&self) -> &'static ScaleDegree {
        &SCALE_DEGREES[self.degree]
    }

    pub fn label(&self) -> &'static str {
        self.scale_degree().label
    }

    /// The sounding note of the degree, above the tonic.
    pub fn target(&self) -> Note {
        self.scale_degree().above(self.tonic)
    }
}

pub fn generate_question<R: Rng + ?Sized>(
    rng: &mut R,
    enabled: &EnabledSet,
) -> Result<DegreeQuestion, DomainError> {
    let candidates: Vec<usize> = enabled
        .enabled_indices()
        .into_iter()
        .filter(|index| *index < SCALE_DEGREES.len())
        .collect();
    let degree = *candidates
        .choose(rng)
        .ok_or(DomainError::EmptyEnabledSet("scale degrees"))?;
    let tonic = TONICS[rng.gen_range(0..TONICS.len())];
    DegreeQuestion::new(tonic, degree)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DegreeOutcome {
    pub correct: bool,
    pub answer: &'static str,
}

#[derive(Debug, Clone)]
pub struct ScaleDegreeQuiz {
    enabled: EnabledSet,
    accuracy: AccuracyMatrix,
    pending: Option<DegreeQuestion>,
}

impl ScaleDegreeQuiz {
    pub fn new(enabled: EnabledSet, accuracy: AccuracyMatrix) -> Result<Self, DomainError> {
        if enabled.len() != SCALE_DEGREES.len() {
            return Err(DomainError::validation(format!(
                "scale degree mask needs {} entries, got {}",
                SCALE_DEGREES.len(),
                enabled.len()
            )));
        }
        Ok(Self {
            enabled,
            accuracy,
            pending: None,
        })
    }

    pub fn enabled(&self) -> &EnabledSet {
        &self.enabled
    }

    pub fn accuracy(&self) -> &AccuracyMatrix {
        &self.accuracy
    }

    pub fn pending(&self) -> Option<&DegreeQuestion> {
        self.pending.as_ref()
    }

    /// Degrees offered as answers: the enabled ones, in catalog order.
    pub fn answer_choices(&self) -> Vec<&'static ScaleDegree> {
        self.enabled
            .enabled_indices()
            .into_iter()
            .filter_map(|index| SCALE_DEGREES.get(index))
            .collect()
    }

    /// Returns the question to sound. While one is unanswered the same
    /// question comes back, so replaying the prompt never re-rolls it.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DegreeQuestion, DomainError> {
        if let Some(question) = self.pending {
            debug!(degree = question.label(), "replaying pending question");
            return Ok(question);
        }
        let question = generate_question(rng, &self.enabled)?;
        debug!(tonic = %question.tonic(), degree = question.label(), "new scale degree question");
        self.pending = Some(question);
        Ok(question)
    }

    /// Resolves the pending question and counts it once against its degree.
    /// A label outside the catalog is ignored and the question stays pending.
    pub fn submit_answer(&mut self, label: &str) -> Option<DegreeOutcome> {
        let chosen = match catalog::degree_by_label(label) {
            Ok(chosen) => chosen,
            Err(err) => {
                debug!(%err, "ignoring unknown degree label");
                return None;
            }
        };
        let question = self.pending.take()?;
        let correct = chosen == question.degree;
        if let Err(err) = self.accuracy.record(question.degree, correct) {
            warn!(%err, "could not record scale degree accuracy");
        }
        debug!(correct, answer = question.label(), "scale degree answered");
        Some(DegreeOutcome {
            correct,
            answer: question.label(),
        })
    }

    /// Drops the pending question without counting it.
    pub fn abandon(&mut self) -> Option<DegreeQuestion> {
        self.pending.take()
    }

    pub fn toggle(&mut self, index: usize) -> Result<bool, DomainError> {
        self.enabled.toggle(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiz_with(indices: &[usize]) -> ScaleDegreeQuiz {
        let enabled = EnabledSet::only(SCALE_DEGREES.len(), indices).unwrap();
        ScaleDegreeQuiz::new(enabled, AccuracyMatrix::new()).unwrap()
    }

    #[test]
    fn replay_keeps_the_pending_question() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut quiz = ScaleDegreeQuiz::new(EnabledSet::all(12), AccuracyMatrix::new()).unwrap();
        let first = quiz.play(&mut rng).unwrap();
        for _ in 0..20 {
            assert_eq!(quiz.play(&mut rng).unwrap(), first);
        }
        quiz.submit_answer(first.label()).unwrap();
        assert!(quiz.pending().is_none());
    }

    #[test]
    fn each_question_counts_once() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut quiz = quiz_with(&[7]);
        let question = quiz.play(&mut rng).unwrap();
        quiz.play(&mut rng).unwrap();
        let outcome = quiz.submit_answer("4").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.answer, "5");
        assert!(quiz.submit_answer("5").is_none());
        let tally = quiz.accuracy().get(question.degree()).unwrap();
        assert_eq!((tally.correct, tally.total), (0, 1));

        quiz.play(&mut rng).unwrap();
        assert!(quiz.submit_answer("5").unwrap().correct);
        let tally = quiz.accuracy().get(7).unwrap();
        assert_eq!((tally.correct, tally.total), (1, 2));
    }

    #[test]
    fn unknown_labels_leave_the_question_pending() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut quiz = quiz_with(&[2]);
        let question = quiz.play(&mut rng).unwrap();
        assert!(quiz.submit_answer("not-a-degree").is_none());
        assert!(quiz.submit_answer("").is_none());
        assert_eq!(quiz.pending(), Some(&question));
        assert!(quiz.accuracy().cells().iter().all(|cell| cell.total == 0));

        assert!(quiz.submit_answer("2").unwrap().correct);
        let tally = quiz.accuracy().get(2).unwrap();
        assert_eq!((tally.correct, tally.total), (1, 1));
    }

    #[test]
    fn only_enabled_degrees_are_asked() {
        let mut rng = Pcg32::seed_from_u64(8);
        let enabled = EnabledSet::only(12, &[0]).unwrap();
        for _ in 0..100 {
            let question = generate_question(&mut rng, &enabled).unwrap();
            assert_eq!(question.label(), "1");
            assert!(TONICS.contains(&question.tonic()));
        }
    }

    #[test]
    fn abandoning_rolls_a_new_question() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut quiz = quiz_with(&[0, 4, 7]);
        quiz.play(&mut rng).unwrap();
        assert!(quiz.abandon().is_some());
        assert!(quiz.submit_answer("1").is_none());
        assert!(quiz.accuracy().cells().iter().all(|cell| cell.total == 0));
    }

    #[test]
    fn target_note_carries_the_octave() {
        let question = DegreeQuestion::new(TONICS[5], 11).unwrap();
        assert_eq!(question.target().to_string(), "G#3");
        assert!(DegreeQuestion::new(TONICS[0], 12).is_err());
    }

    #[test]
    fn answer_choices_follow_the_mask() {
        let mut quiz = quiz_with(&[0, 3]);
        let labels: Vec<_> = quiz.answer_choices().iter().map(|d| d.label).collect();
        assert_eq!(labels, ["1", "b3"]);
        assert_eq!(quiz.toggle(0), Ok(true));
        assert_eq!(quiz.toggle(3), Ok(false));
    }
}
