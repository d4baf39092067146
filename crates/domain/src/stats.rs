use serde::{Deserialize, Serialize};

use crate::catalog::{INTERVALS, SCALE_DEGREES};
use crate::pitch::{Direction, PitchClass, PITCH_CLASS_COUNT};
use crate::DomainError;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccuracyTally {
    pub correct: u32,
    pub total: u32,
}

impl AccuracyTally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// `None` until something has been answered.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }
}

/// Correct/total answers per scale degree, keyed by catalog index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<AccuracyTally>", into = "Vec<AccuracyTally>")]
pub struct AccuracyMatrix {
    cells: Vec<AccuracyTally>,
}

impl AccuracyMatrix {
    pub fn new() -> Self {
        Self {
            cells: vec![AccuracyTally::default(); SCALE_DEGREES.len()],
        }
    }

    pub fn record(&mut self, degree: usize, correct: bool) -> Result<(), DomainError> {
        self.cells
            .get_mut(degree)
            .ok_or_else(|| DomainError::unknown_index("scale degree", degree))?
            .record(correct);
        Ok(())
    }

    pub fn get(&self, degree: usize) -> Option<&AccuracyTally> {
        self.cells.get(degree)
    }

    pub fn cells(&self) -> &[AccuracyTally] {
        &self.cells
    }
}

impl Default for AccuracyMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<AccuracyTally>> for AccuracyMatrix {
    type Error = DomainError;

    fn try_from(cells: Vec<AccuracyTally>) -> Result<Self, Self::Error> {
        if cells.len() != SCALE_DEGREES.len() {
            return Err(DomainError::validation(format!(
                "accuracy matrix needs {} cells, got {}",
                SCALE_DEGREES.len(),
                cells.len()
            )));
        }
        if cells.iter().any(|cell| cell.correct > cell.total) {
            return Err(DomainError::validation(
                "accuracy cell has more correct answers than attempts",
            ));
        }
        Ok(Self { cells })
    }
}

impl From<AccuracyMatrix> for Vec<AccuracyTally> {
    fn from(matrix: AccuracyMatrix) -> Self {
        matrix.cells
    }
}

/// Response times in seconds for correct interval answers. Rows are start
/// notes; each interval owns two columns, ascending then descending.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Vec<Vec<f64>>>", into = "Vec<Vec<Vec<f64>>>")]
pub struct TimingMatrix {
    rows: Vec<Vec<Vec<f64>>>,
}

impl TimingMatrix {
    pub const COLUMNS: usize = INTERVALS.len() * 2;

    pub fn new() -> Self {
        Self {
            rows: vec![vec![Vec::new(); Self::COLUMNS]; PITCH_CLASS_COUNT],
        }
    }

    pub fn column(interval: usize, direction: Direction) -> usize {
        interval * 2
            + match direction {
                Direction::Ascending => 0,
                Direction::Descending => 1,
            }
    }

    pub fn record(
        &mut self,
        note: PitchClass,
        interval: usize,
        direction: Direction,
        seconds: f64,
    ) -> Result<(), DomainError> {
        if interval >= INTERVALS.len() {
            return Err(DomainError::unknown_index("interval", interval));
        }
        self.rows[note.index()][Self::column(interval, direction)].push(seconds);
        Ok(())
    }

    pub fn samples(&self, note: PitchClass, interval: usize, direction: Direction) -> &[f64] {
        if interval >= INTERVALS.len() {
            return &[];
        }
        self.cell(note.index(), Self::column(interval, direction))
    }

    pub fn cell(&self, row: usize, column: usize) -> &[f64] {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sample_count(&self) -> usize {
        self.rows.iter().flatten().map(Vec::len).sum()
    }
}

impl Default for TimingMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Vec<Vec<f64>>>> for TimingMatrix {
    type Error = DomainError;

    fn try_from(rows: Vec<Vec<Vec<f64>>>) -> Result<Self, Self::Error> {
        let shaped = rows.len() == PITCH_CLASS_COUNT
            && rows.iter().all(|row| row.len() == Self::COLUMNS);
        if !shaped {
            return Err(DomainError::validation(format!(
                "timing matrix must be {}x{}",
                PITCH_CLASS_COUNT,
                Self::COLUMNS
            )));
        }
        Ok(Self { rows })
    }
}

impl From<TimingMatrix> for Vec<Vec<Vec<f64>>> {
    fn from(matrix: TimingMatrix) -> Self {
        matrix.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tally_percentage_is_undefined_until_answered() {
        let mut tally = AccuracyTally::default();
        assert_eq!(tally.percentage(), None);
        tally.record(true);
        tally.record(false);
        tally.record(true);
        tally.record(true);
        assert_eq!(tally, AccuracyTally { correct: 3, total: 4 });
        assert_relative_eq!(tally.percentage().unwrap(), 75.0);
    }

    #[test]
    fn accuracy_matrix_validates_shape() {
        let mut matrix = AccuracyMatrix::new();
        matrix.record(3, true).unwrap();
        assert!(matrix.record(12, true).is_err());
        let json = serde_json::to_string(&matrix).unwrap();
        let back: AccuracyMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(3).unwrap().correct, 1);
        assert!(serde_json::from_str::<AccuracyMatrix>("[]").is_err());
    }

    #[test]
    fn timing_columns_interleave_directions() {
        assert_eq!(TimingMatrix::column(0, Direction::Ascending), 0);
        assert_eq!(TimingMatrix::column(0, Direction::Descending), 1);
        assert_eq!(TimingMatrix::column(11, Direction::Descending), 23);
    }

    #[test]
    fn timing_matrix_appends_samples() {
        let mut timings = TimingMatrix::new();
        let d = PitchClass::D;
        timings.record(d, 4, Direction::Descending, 2.5).unwrap();
        timings.record(d, 4, Direction::Descending, 1.5).unwrap();
        assert_eq!(timings.samples(d, 4, Direction::Descending), &[2.5, 1.5]);
        assert!(timings.samples(d, 4, Direction::Ascending).is_empty());
        assert_eq!(timings.cell(2, 9), &[2.5, 1.5]);
        assert_eq!(timings.sample_count(), 2);
        assert!(timings.record(d, 12, Direction::Ascending, 1.0).is_err());
    }
}
