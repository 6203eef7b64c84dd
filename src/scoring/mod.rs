/// Contingency tables and skill scores.
///
/// Three table variants share a common fill/get/set/render/merge contract:
///
/// - `ProbabilityTable` — 2 x K counts of binary outcomes against binned
///   forecast probabilities; Brier Score decomposition and skill score.
/// - `CategoryTable` — N x N counts of forecast vs observed categories;
///   Heidke and Peirce skill scores.
/// - `ContinuousTable` — paired forecast/observation samples with a derived
///   error vector; mean error, mean absolute error, RMSE.
///
/// Tables are accumulated single-threaded during the batch and scored
/// afterwards. Shape violations are typed, recoverable errors; numerically
/// undefined scores come back as non-finite floats, never as panics.

pub mod categorical;
pub mod continuous;
pub mod probability;

pub use categorical::CategoryTable;
pub use continuous::ContinuousTable;
pub use probability::{BrierComponents, ProbabilityTable};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable contingency-table errors. Construction or mutation that
/// would corrupt a table's shape is rejected without touching the table.
#[derive(Debug, PartialEq)]
pub enum TableError {
    /// `fill` or `merge_from` was handed a grid of the wrong dimensions.
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A probability table's labels must cover exactly its columns.
    LabelCount { labels: usize, columns: usize },
    /// Merging tables whose bin or category labels disagree.
    LabelMismatch,
    /// `add_pairs` was handed forecast and observation slices of
    /// different lengths.
    LengthMismatch { forecasts: usize, observations: usize },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::ShapeMismatch { expected, got } => write!(
                f,
                "table shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, got.0, got.1
            ),
            TableError::LabelCount { labels, columns } => write!(
                f,
                "label count mismatch: {} labels for {} columns",
                labels, columns
            ),
            TableError::LabelMismatch => write!(f, "cannot merge tables with different labels"),
            TableError::LengthMismatch {
                forecasts,
                observations,
            } => write!(
                f,
                "paired-sample length mismatch: {} forecasts, {} observations",
                forecasts, observations
            ),
        }
    }
}

impl std::error::Error for TableError {}

// ---------------------------------------------------------------------------
// Count grid
// ---------------------------------------------------------------------------

/// Dense row-major count grid shared by the two gridded table variants.
///
/// Cells are `f64` so that filled-in historical tables and merged tables
/// stay exact while still dividing cleanly in score formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Grid {
    /// Zero-filled grid of the given dimensions.
    pub fn zeros(rows: usize, cols: usize) -> Grid {
        Grid {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.cols + col] = value;
    }

    pub fn add(&mut self, row: usize, col: usize, amount: f64) {
        self.cells[row * self.cols + col] += amount;
    }

    /// Replaces the grid's contents. The replacement must match the grid's
    /// shape exactly; on mismatch the grid is left untouched.
    pub fn fill(&mut self, data: &[Vec<f64>]) -> Result<(), TableError> {
        if data.len() != self.rows || data.iter().any(|row| row.len() != self.cols) {
            let got_cols = data.first().map(|row| row.len()).unwrap_or(0);
            return Err(TableError::ShapeMismatch {
                expected: (self.rows, self.cols),
                got: (data.len(), got_cols),
            });
        }
        for (r, row) in data.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                self.set(r, c, *value);
            }
        }
        Ok(())
    }

    /// Cell-wise sum of another grid into this one. Shapes must agree.
    pub fn merge_from(&mut self, other: &Grid) -> Result<(), TableError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(TableError::ShapeMismatch {
                expected: (self.rows, self.cols),
                got: (other.rows, other.cols),
            });
        }
        for (cell, add) in self.cells.iter_mut().zip(&other.cells) {
            *cell += add;
        }
        Ok(())
    }

    /// Sum over all cells.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Per-row sums (forecast-category totals in an N x N table).
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| self.get(r, c)).sum())
            .collect()
    }

    /// Per-column sums (observed-category totals in an N x N table).
    pub fn col_sums(&self) -> Vec<f64> {
        (0..self.cols)
            .map(|c| (0..self.rows).map(|r| self.get(r, c)).sum())
            .collect()
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> f64 {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).sum()
    }

    /// Fixed-width rendering, one line per row, two decimal places.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.push_str(&format!("{:8.2} ", self.get(r, c)));
            }
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
