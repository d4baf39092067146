use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CellSummary {
    pub average: f64,
    pub tier: SpeedTier,
    pub samples: usize,
}

/// Mean of the last `window` samples, or `None` when there are none.
pub fn rolling_average(samples: &[f64], window: usize) -> Option<f64> {
    let recent = &samples[samples.len().saturating_sub(window)..];
    if recent.is_empty() {
        return None;
    }
    Some(recent.iter().sum::<f64>() / recent.len() as f64)
}

/// Buckets an average response time in seconds.
pub fn classify(average: f64) -> SpeedTier {
    if average < 3.0 {
        SpeedTier::Fast
    } else if average < 10.0 {
        SpeedTier::Medium
    } else {
        SpeedTier::Slow
    }
}

pub fn summarize(samples: &[f64]) -> Option<CellSummary> {
    let average = rolling_average(samples, DEFAULT_WINDOW)?;
    Some(CellSummary {
        average,
        tier: classify(average),
        samples: samples.len(),
    })
}
