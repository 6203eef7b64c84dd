/// Multi-category contingency table: forecast categories (rows) against
/// observed categories (columns), scored with the Heidke and Peirce skill
/// scores, both of which correct raw accuracy for chance agreement.

use serde::{Deserialize, Serialize};

use super::{Grid, TableError};

/// An N x N count grid with one row and one column per category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    labels: Vec<String>,
    grid: Grid,
}

impl CategoryTable {
    /// Empty square table with one row/column per label, so the squareness
    /// invariant holds by construction.
    pub fn new(labels: Vec<String>) -> CategoryTable {
        let n = labels.len();
        CategoryTable {
            labels,
            grid: Grid::zeros(n, n),
        }
    }

    /// Table pre-filled with existing counts. `data` must be N x N where N
    /// matches the label count.
    pub fn with_data(labels: Vec<String>, data: &[Vec<f64>]) -> Result<CategoryTable, TableError> {
        let mut table = CategoryTable::new(labels);
        table.grid.fill(data)?;
        Ok(table)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, forecast: usize, observed: usize) -> f64 {
        self.grid.get(forecast, observed)
    }

    pub fn set(&mut self, forecast: usize, observed: usize, value: f64) {
        self.grid.set(forecast, observed, value);
    }

    /// Replaces the table's counts, rejecting a wrong-shaped grid.
    pub fn fill(&mut self, data: &[Vec<f64>]) -> Result<(), TableError> {
        self.grid.fill(data)
    }

    /// Counts one verified forecast by category index.
    pub fn record(&mut self, forecast: usize, observed: usize) {
        self.grid.add(forecast, observed, 1.0);
    }

    pub fn total(&self) -> f64 {
        self.grid.total()
    }

    /// Cell-wise sum of another table into this one. Both tables must carry
    /// identical category labels.
    pub fn merge_from(&mut self, other: &CategoryTable) -> Result<(), TableError> {
        if self.labels != other.labels {
            return Err(TableError::LabelMismatch);
        }
        self.grid.merge_from(&other.grid)
    }

    /// Multi-category Heidke Skill Score:
    ///
    ///   HSS = [diag/N - sum(NO*NF)/N^2] / [1 - sum(NF*NO)/N^2]
    ///
    /// where NO are observed-category totals (column sums), NF are
    /// forecast-category totals (row sums), and diag is the trace. 1.0 is a
    /// perfect categorical forecast; 0.0 is chance. Non-finite on an empty
    /// table or when the denominator vanishes.
    pub fn heidke_skill_score(&self) -> f64 {
        let n = self.total();
        let no = self.grid.col_sums();
        let nf = self.grid.row_sums();
        let cross: f64 = no.iter().zip(&nf).map(|(o, f)| o * f).sum();
        (self.grid.trace() / n - cross / n.powi(2)) / (1.0 - cross / n.powi(2))
    }

    /// Multi-category Peirce Skill Score (Hanssen-Kuipers, true skill
    /// statistic). Same numerator as Heidke with the observed-category
    /// marginal in the denominator:
    ///
    ///   PSS = [diag/N - sum(NO*NF)/N^2] / [1 - sum(NO^2)/N^2]
    pub fn peirce_skill_score(&self) -> f64 {
        let n = self.total();
        let no = self.grid.col_sums();
        let nf = self.grid.row_sums();
        let cross: f64 = no.iter().zip(&nf).map(|(o, f)| o * f).sum();
        let obs_sq: f64 = no.iter().map(|o| o * o).sum();
        (self.grid.trace() / n - cross / n.powi(2)) / (1.0 - obs_sq / n.powi(2))
    }
}

impl std::fmt::Display for CategoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grid.render())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
