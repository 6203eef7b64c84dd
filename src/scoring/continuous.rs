/// Continuous-error table: paired forecast and observed values with a
/// derived `forecast - observation` error vector, scored with mean error,
/// mean absolute error, and root-mean-square error.

use serde::{Deserialize, Serialize};

use crate::model::AGGREGATE_MISSING;

use super::TableError;

/// Paired samples for one station/variable/period. Unlike the gridded
/// variants this is not a count table: it keeps every matched pair and
/// derives the error vector from pairs whose observation is real data
/// (strictly greater than the −998 aggregate-missing sentinel).
///
/// The forecast and observation arrays are equal length at all times,
/// including after incremental appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousTable {
    forecasts: Vec<f64>,
    observations: Vec<f64>,
    errors: Vec<f64>,
}

impl ContinuousTable {
    /// Empty table.
    pub fn new() -> ContinuousTable {
        ContinuousTable {
            forecasts: Vec::new(),
            observations: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Table pre-filled with existing pairs.
    pub fn with_pairs(forecasts: &[f64], observations: &[f64]) -> Result<ContinuousTable, TableError> {
        let mut table = ContinuousTable::new();
        table.add_pairs(forecasts, observations)?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    pub fn forecasts(&self) -> &[f64] {
        &self.forecasts
    }

    pub fn observations(&self) -> &[f64] {
        &self.observations
    }

    /// The error vector over valid pairs. Shorter than `len()` when some
    /// observations are the aggregate-missing sentinel.
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Appends matched pairs. The slices must be equal length; on mismatch
    /// the table is left untouched. The error vector is recomputed over the
    /// entire accumulated history, not just the new pairs, so a `fill` after
    /// partial accumulation cannot leave stale errors behind.
    pub fn add_pairs(&mut self, forecasts: &[f64], observations: &[f64]) -> Result<(), TableError> {
        if forecasts.len() != observations.len() {
            return Err(TableError::LengthMismatch {
                forecasts: forecasts.len(),
                observations: observations.len(),
            });
        }
        self.forecasts.extend_from_slice(forecasts);
        self.observations.extend_from_slice(observations);
        self.recompute_errors();
        Ok(())
    }

    /// Replaces the table's pairs outright, with the same length check.
    pub fn fill(&mut self, forecasts: &[f64], observations: &[f64]) -> Result<(), TableError> {
        if forecasts.len() != observations.len() {
            return Err(TableError::LengthMismatch {
                forecasts: forecasts.len(),
                observations: observations.len(),
            });
        }
        self.forecasts = forecasts.to_vec();
        self.observations = observations.to_vec();
        self.recompute_errors();
        Ok(())
    }

    fn recompute_errors(&mut self) {
        self.errors = self
            .forecasts
            .iter()
            .zip(&self.observations)
            .filter(|(_, obs)| **obs > AGGREGATE_MISSING)
            .map(|(fcst, obs)| fcst - obs)
            .collect();
    }

    /// Arithmetic mean of the error vector. NaN when no valid pairs exist;
    /// callers tolerate non-finite results rather than special-casing.
    pub fn mean_error(&self) -> f64 {
        self.errors.iter().sum::<f64>() / self.errors.len() as f64
    }

    /// Mean of absolute errors. NaN when no valid pairs exist.
    pub fn mean_absolute_error(&self) -> f64 {
        self.errors.iter().map(|e| e.abs()).sum::<f64>() / self.errors.len() as f64
    }

    /// Root of the mean squared error. NaN when no valid pairs exist.
    pub fn root_mean_square_error(&self) -> f64 {
        (self.errors.iter().map(|e| e * e).sum::<f64>() / self.errors.len() as f64).sqrt()
    }
}

impl Default for ContinuousTable {
    fn default() -> Self {
        ContinuousTable::new()
    }
}

impl std::fmt::Display for ContinuousTable {
    /// Fixed-width rendering: forecast row, observation row, error row.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in [&self.forecasts, &self.observations, &self.errors] {
            for value in row.iter() {
                write!(f, "{:8.2} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
