use serde::Serialize;

use solfa_domain::{
    AccuracyMatrix, AccuracyTally, Direction, PitchClass, TimingMatrix, INTERVALS, SCALE_DEGREES,
};

use crate::metrics::{summarize, CellSummary};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimingCell {
    pub interval: &'static str,
    pub direction: Direction,
    pub summary: Option<CellSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimingRow {
    pub note: PitchClass,
    pub cells: Vec<TimingCell>,
}

/// Rolling response times for every start note, interval and direction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimingReport {
    pub rows: Vec<TimingRow>,
}

impl TimingReport {
    pub fn from_matrix(timings: &TimingMatrix) -> Self {
        let rows = PitchClass::all()
            .map(|note| TimingRow {
                note,
                cells: INTERVALS
                    .iter()
                    .enumerate()
                    .flat_map(|(index, interval)| {
                        [Direction::Ascending, Direction::Descending].map(|direction| TimingCell {
                            interval: interval.name,
                            direction,
                            summary: summarize(timings.samples(note, index, direction)),
                        })
                    })
                    .collect(),
            })
            .collect();
        Self { rows }
    }

    /// Cells with data, slowest average first.
    pub fn slowest(&self, limit: usize) -> Vec<(PitchClass, &TimingCell)> {
        let mut cells: Vec<(PitchClass, &TimingCell, f64)> = self
            .rows
            .iter()
            .flat_map(|row| {
                row.cells
                    .iter()
                    .filter_map(move |cell| cell.summary.map(|s| (row.note, cell, s.average)))
            })
            .collect();
        cells.sort_by(|a, b| b.2.total_cmp(&a.2));
        cells
            .into_iter()
            .take(limit)
            .map(|(note, cell, _)| (note, cell))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DegreeAccuracy {
    pub label: &'static str,
    pub tally: AccuracyTally,
    pub percentage: Option<f64>,
}

pub fn accuracy_report(accuracy: &AccuracyMatrix) -> Vec<DegreeAccuracy> {
    SCALE_DEGREES
        .iter()
        .zip(accuracy.cells())
        .map(|(degree, tally)| DegreeAccuracy {
            label: degree.label,
            tally: *tally,
            percentage: tally.percentage(),
        })
        .collect()
}

/// `"—"` when nothing has been answered yet.
pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(value) => format!("{value:.0}%"),
        None => "—".to_string(),
    }
}
