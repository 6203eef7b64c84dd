/// Probabilistic contingency table: binary outcomes against binned
/// forecast probabilities, and the Brier Score family computed from it.

use serde::{Deserialize, Serialize};

use super::{Grid, TableError};

/// A 2 x K count grid. Columns are forecast-probability bins (labelled with
/// each bin's representative probability), row 0 counts non-occurrences and
/// row 1 counts occurrences of the forecast event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    labels: Vec<f64>,
    grid: Grid,
}

/// The Brier Score decomposition. `score` is always exactly
/// `reliability - resolution + uncertainty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrierComponents {
    pub score: f64,
    pub reliability: f64,
    pub resolution: f64,
    pub uncertainty: f64,
}

impl ProbabilityTable {
    /// Empty table with one column per probability label. The label vector
    /// defines the column count, so the label/column invariant holds by
    /// construction.
    pub fn new(labels: Vec<f64>) -> ProbabilityTable {
        let grid = Grid::zeros(2, labels.len());
        ProbabilityTable { labels, grid }
    }

    /// Table pre-filled with existing counts. `data` must be 2 x K where K
    /// matches the label count.
    pub fn with_data(labels: Vec<f64>, data: &[Vec<f64>]) -> Result<ProbabilityTable, TableError> {
        let mut table = ProbabilityTable::new(labels);
        table.grid.fill(data)?;
        Ok(table)
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn bins(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.grid.get(row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.grid.set(row, col, value);
    }

    /// Replaces the table's counts, rejecting a wrong-shaped grid.
    pub fn fill(&mut self, data: &[Vec<f64>]) -> Result<(), TableError> {
        self.grid.fill(data)
    }

    /// Counts one verified forecast: the bin it was forecast in and whether
    /// the event occurred. Bins past the last label land in the last bin;
    /// a zero-bin table has nowhere to count and ignores the call.
    pub fn record(&mut self, occurred: bool, bin: usize) {
        if self.bins() == 0 {
            return;
        }
        let col = bin.min(self.bins() - 1);
        self.grid.add(occurred as usize, col, 1.0);
    }

    /// Total number of verified forecasts in the table.
    pub fn total(&self) -> f64 {
        self.grid.total()
    }

    /// Number of verified forecasts where the event occurred.
    pub fn occurrences(&self) -> f64 {
        (0..self.bins()).map(|k| self.grid.get(1, k)).sum()
    }

    /// Cell-wise sum of another table into this one. Both tables must carry
    /// identical probability labels.
    pub fn merge_from(&mut self, other: &ProbabilityTable) -> Result<(), TableError> {
        if self.labels != other.labels {
            return Err(TableError::LabelMismatch);
        }
        self.grid.merge_from(&other.grid)
    }

    /// Reliability-diagram data: observed event frequency per probability
    /// bin. Bins holding no forecasts yield 0, not NaN, so the vector is
    /// always plottable.
    pub fn reliability(&self) -> Vec<f64> {
        (0..self.bins())
            .map(|k| {
                let n_k = self.grid.get(0, k) + self.grid.get(1, k);
                if n_k > 0.0 {
                    self.grid.get(1, k) / n_k
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Brier Score decomposition over the table's counts.
    ///
    /// With no forecasts at all the climatology is 0/0 and every component
    /// is NaN; callers tolerate non-finite scores rather than special-case
    /// empty tables.
    pub fn brier_components(&self) -> BrierComponents {
        let n = self.total();
        let climo = self.occurrences() / n;
        let obs_freq = self.reliability();

        let mut reliability = 0.0;
        let mut resolution = 0.0;
        for k in 0..self.bins() {
            let n_k = self.grid.get(0, k) + self.grid.get(1, k);
            reliability += n_k * (self.labels[k] - obs_freq[k]).powi(2);
            resolution += n_k * (obs_freq[k] - climo).powi(2);
        }
        reliability /= n;
        resolution /= n;
        let uncertainty = climo * (1.0 - climo);

        BrierComponents {
            score: reliability - resolution + uncertainty,
            reliability,
            resolution,
            uncertainty,
        }
    }

    /// The Brier Score alone.
    pub fn brier_score(&self) -> f64 {
        self.brier_components().score
    }

    /// Brier Skill Score against the table's own climatology:
    /// (resolution - reliability) / uncertainty.
    ///
    /// Non-finite when uncertainty is zero, i.e. the event either never or
    /// always occurred over the period. That is a legitimate climatology,
    /// not a bug; the caller reports the non-finite value as undefined.
    pub fn brier_skill_score(&self) -> f64 {
        let c = self.brier_components();
        (c.resolution - c.reliability) / c.uncertainty
    }
}

impl std::fmt::Display for ProbabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grid.render())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
