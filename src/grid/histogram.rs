use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Extent – the data rectangle covered by a grid
// ---------------------------------------------------------------------------

/// `[xmin, xmax, ymin, ymax]` rectangle mapping grid indices to data
/// coordinates. Shared by every dataset in an overlay so their grids line up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }

    /// Check both axes are finite and non-degenerate.
    pub fn validate(&self) -> Result<()> {
        let all_finite = self.as_array().iter().all(|v| v.is_finite());
        if !all_finite || self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(Error::config(format!(
                "histogram range {:?} must be finite with min < max on both axes",
                self.as_array()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DensityGrid – binned (E, n) densities
// ---------------------------------------------------------------------------

/// A 2D grid of non-negative cell values.
///
/// Values are stored row-major with one row per y bin, so `values[j * nx + i]`
/// is the cell at x bin `i`, y bin `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    nx: usize,
    ny: usize,
    values: Vec<f64>,
    extent: Extent,
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
}

impl DensityGrid {
    /// An all-zero grid of `nx × ny` cells over `extent`.
    pub fn zeros(nx: usize, ny: usize, extent: Extent) -> Self {
        Self {
            nx,
            ny,
            values: vec![0.0; nx * ny],
            extent,
            x_edges: bin_edges(extent.x_min, extent.x_max, nx),
            y_edges: bin_edges(extent.y_min, extent.y_max, ny),
        }
    }

    /// Build a grid from row-major values (one row per y bin).
    pub fn from_rows(nx: usize, ny: usize, values: Vec<f64>, extent: Extent) -> Result<Self> {
        if nx == 0 || ny == 0 || values.len() != nx * ny {
            return Err(Error::config(format!(
                "grid of {nx}x{ny} cells cannot hold {} values",
                values.len()
            )));
        }
        let mut grid = Self::zeros(nx, ny, extent);
        grid.values = values;
        Ok(grid)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Cell value at x bin `i`, y bin `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx + i]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[j * self.nx + i] = value;
    }

    /// Largest cell value, or 0.0 for an empty grid.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Data x coordinate of the centre of column `i` (may be fractional).
    pub fn x_at(&self, i: f64) -> f64 {
        let dx = (self.extent.x_max - self.extent.x_min) / self.nx as f64;
        self.extent.x_min + (i + 0.5) * dx
    }

    /// Data y coordinate of the centre of row `j` (may be fractional).
    pub fn y_at(&self, j: f64) -> f64 {
        let dy = (self.extent.y_max - self.extent.y_min) / self.ny as f64;
        self.extent.y_min + (j + 0.5) * dy
    }
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// `bins + 1` equally spaced edges from `min` to `max`; the last edge is
/// exactly `max`.
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=bins)
        .map(|k| min + (max - min) * k as f64 / bins as f64)
        .collect();
    if let Some(last) = edges.last_mut() {
        *last = max;
    }
    edges
}

/// Index of the bin containing `v`, or `None` if `v` lies outside the edges.
///
/// A value on an interior edge belongs to the bin on its right; the last bin
/// is closed on both sides.
fn bin_index(edges: &[f64], v: f64) -> Option<usize> {
    let bins = edges.len().checked_sub(1)?;
    let (min, max) = (edges[0], edges[bins]);
    if bins == 0 || !(v >= min && v <= max) {
        return None;
    }
    if v == max {
        return Some(bins - 1);
    }
    let guess = (((v - min) / (max - min)) * bins as f64).floor() as usize;
    let mut idx = guess.min(bins - 1);
    // Rounding in the guess can land one bin off near an edge.
    if v < edges[idx] && idx > 0 {
        idx -= 1;
    } else if v >= edges[idx + 1] && idx + 1 < bins {
        idx += 1;
    }
    Some(idx)
}

/// Bin `(x, y)` points into a `bins × bins` count grid over `extent`.
///
/// Points outside the extent on either axis, and NaN coordinates, are
/// dropped.
pub fn histogram_2d<I>(points: I, bins: usize, extent: Extent) -> Result<DensityGrid>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    if bins == 0 {
        return Err(Error::config("histogram needs at least one bin"));
    }
    extent.validate()?;

    let mut grid = DensityGrid::zeros(bins, bins, extent);
    let mut dropped = 0usize;
    for (x, y) in points {
        match (bin_index(&grid.x_edges, x), bin_index(&grid.y_edges, y)) {
            (Some(i), Some(j)) => grid.values[j * grid.nx + i] += 1.0,
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("{dropped} points fell outside the histogram range");
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_extent() -> Extent {
        Extent::new(0.0, 4.0, 0.0, 4.0)
    }

    #[test]
    fn edges_are_uniform_and_end_exactly_at_max() {
        let edges = bin_edges(10.0, 10000.0, 200);
        assert_eq!(edges.len(), 201);
        assert_eq!(edges[0], 10.0);
        assert_eq!(edges[200], 10000.0);
        assert!((edges[1] - edges[0] - 49.95).abs() < 1e-9);
    }

    #[test]
    fn interior_edge_goes_right_and_max_goes_last() {
        let edges = bin_edges(0.0, 4.0, 4);
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 1.0), Some(1));
        assert_eq!(bin_index(&edges, 3.999), Some(3));
        assert_eq!(bin_index(&edges, 4.0), Some(3));
        assert_eq!(bin_index(&edges, 4.0001), None);
        assert_eq!(bin_index(&edges, -0.1), None);
        assert_eq!(bin_index(&edges, f64::NAN), None);
    }

    #[test]
    fn counts_land_in_transposed_layout() {
        let grid = histogram_2d(
            vec![(0.5, 3.5), (0.6, 3.4), (3.5, 0.5), (9.0, 1.0)],
            4,
            unit_extent(),
        )
        .unwrap();
        assert_eq!(grid.get(0, 3), 2.0);
        assert_eq!(grid.get(3, 0), 1.0);
        assert_eq!(grid.sum(), 3.0);
        assert_eq!(grid.max(), 2.0);
        assert_eq!(grid.extent().as_array(), [0.0, 4.0, 0.0, 4.0]);
    }

    #[test]
    fn empty_input_gives_zero_grid() {
        let grid = histogram_2d(std::iter::empty(), 8, unit_extent()).unwrap();
        assert_eq!(grid.nx(), 8);
        assert_eq!(grid.ny(), 8);
        assert_eq!(grid.max(), 0.0);
    }

    #[test]
    fn rejects_zero_bins_and_inverted_range() {
        assert!(histogram_2d(std::iter::empty(), 0, unit_extent()).is_err());
        let inverted = Extent::new(5.0, 1.0, 0.0, 1.0);
        assert!(histogram_2d(std::iter::empty(), 4, inverted).is_err());
    }

    #[test]
    fn cell_centres_map_to_data_coordinates() {
        let grid = DensityGrid::zeros(4, 2, Extent::new(0.0, 4.0, 10.0, 20.0));
        assert_eq!(grid.x_at(0.0), 0.5);
        assert_eq!(grid.x_at(3.0), 3.5);
        assert_eq!(grid.y_at(0.0), 12.5);
        assert_eq!(grid.y_at(0.5), 15.0);
    }
}
