use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DomainError;

/// Boolean mask over a fixed catalog. At least one entry stays enabled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<bool>", into = "Vec<bool>")]
pub struct EnabledSet {
    mask: Vec<bool>,
}

impl EnabledSet {
    pub fn all(len: usize) -> Self {
        Self {
            mask: vec![true; len.max(1)],
        }
    }

    pub fn from_mask(mask: Vec<bool>) -> Result<Self, DomainError> {
        if !mask.iter().any(|enabled| *enabled) {
            return Err(DomainError::validation(
                "enabled set requires at least one entry",
            ));
        }
        Ok(Self { mask })
    }

    /// A set with only `indices` enabled.
    pub fn only(len: usize, indices: &[usize]) -> Result<Self, DomainError> {
        let mut mask = vec![false; len];
        for &index in indices {
            *mask
                .get_mut(index)
                .ok_or_else(|| DomainError::unknown_index("enabled set", index))? = true;
        }
        Self::from_mask(mask)
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    pub fn enabled_count(&self) -> usize {
        self.mask.iter().filter(|enabled| **enabled).count()
    }

    /// Enabled catalog indices in catalog order.
    pub fn enabled_indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(index, enabled)| enabled.then_some(index))
            .collect()
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Flips one entry. Returns `Ok(false)` without changing anything when
    /// the entry is the last one still enabled.
    pub fn toggle(&mut self, index: usize) -> Result<bool, DomainError> {
        let enabled = *self
            .mask
            .get(index)
            .ok_or_else(|| DomainError::unknown_index("enabled set", index))?;
        if enabled && self.enabled_count() == 1 {
            debug!(index, "refusing to disable the last enabled entry");
            return Ok(false);
        }
        self.mask[index] = !enabled;
        Ok(true)
    }
}

impl TryFrom<Vec<bool>> for EnabledSet {
    type Error = DomainError;

    fn try_from(mask: Vec<bool>) -> Result<Self, Self::Error> {
        Self::from_mask(mask)
    }
}

impl From<EnabledSet> for Vec<bool> {
    fn from(set: EnabledSet) -> Self {
        set.mask
    }
}
