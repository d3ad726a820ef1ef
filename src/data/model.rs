use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SolutionRow – one row of a solution-set table
// ---------------------------------------------------------------------------

/// A single solution: electron energy, electron density and fit residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionRow {
    /// Mean electron energy `E` (eV).
    pub energy: f64,
    /// Electron density `n` (cm^-3).
    pub density: f64,
    /// Goodness-of-fit metric `F`; smaller is better.
    pub residual: f64,
}

impl SolutionRow {
    pub fn new(energy: f64, density: f64, residual: f64) -> Self {
        Self {
            energy,
            density,
            residual,
        }
    }
}

// ---------------------------------------------------------------------------
// SolutionTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Rows loaded verbatim from one solution-set file.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionTable {
    /// Where the rows came from (used in diagnostics only).
    pub source: PathBuf,
    /// All rows, in file order.
    pub rows: Vec<SolutionRow>,
}

impl SolutionTable {
    pub fn new(source: impl Into<PathBuf>, rows: Vec<SolutionRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(E, n)` pairs in row order, the input of the histogram builder.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows.iter().map(|r| (r.energy, r.density))
    }
}
