use super::model::SolutionTable;

// ---------------------------------------------------------------------------
// Residual filter: keep solutions whose fit metric is below a threshold
// ---------------------------------------------------------------------------

/// Return the rows of `table` whose `F` value is strictly below `threshold`.
///
/// Row order is preserved. A NaN residual never passes, so filtering an
/// already-filtered table with the same threshold returns it unchanged.
/// An empty result is not an error here; it surfaces later as an empty
/// density grid.
pub fn filter_below(table: &SolutionTable, threshold: f64) -> SolutionTable {
    let rows = table
        .rows
        .iter()
        .filter(|row| row.residual < threshold)
        .copied()
        .collect();
    SolutionTable::new(table.source.clone(), rows)
}
