//! End-to-end run: every dataset through load → filter → bin → smooth →
//! normalise → contour, then one export of the composed figure.
//!
//! The first fatal error ends the run before anything is exported, so a
//! failed run never leaves output files behind.

use std::path::Path;

use log::{debug, error, info};

use crate::color::ColorCycle;
use crate::config::{DatasetSpec, PlotConfig};
use crate::contour::{contour_levels, ContourLine};
use crate::data::{filter_below, load_file};
use crate::error::{Error, Result};
use crate::figure::{Figure, FigureStyle};
use crate::grid::{gaussian_smooth, histogram_2d, normalize, DensityGrid};
use crate::render::{export, ExportReport};

/// Everything computed for one dataset before it is drawn.
#[derive(Debug, Clone)]
pub struct DatasetLayer {
    pub name: String,
    /// Rows read from the file.
    pub total_rows: usize,
    /// Rows with `F` below the threshold.
    pub kept_rows: usize,
    /// Peak of the smoothed grid before normalisation.
    pub peak: f64,
    /// Normalised grid (maximum 1.0).
    pub grid: DensityGrid,
    pub lines: Vec<ContourLine>,
}

/// Run the density pipeline for one dataset.
///
/// Fails with [`Error::EmptyOverlap`] when no filtered row lands inside the
/// histogram range.
pub fn process_dataset(spec: &DatasetSpec, config: &PlotConfig) -> Result<DatasetLayer> {
    let table = load_file(&spec.path)?;
    let filtered = filter_below(&table, config.f_upper);
    info!(
        "{}: {} of {} solutions have F < {:e}",
        spec.name,
        filtered.len(),
        table.len(),
        config.f_upper
    );

    let counts = histogram_2d(filtered.points(), config.bins, config.range)?;
    let mut grid = gaussian_smooth(&counts, config.smoothing_sigma)?;
    let peak = match normalize(&mut grid) {
        Ok(peak) => peak,
        Err(Error::EmptyGrid) => {
            error!("{}: density grid is empty after filtering", spec.name);
            return Err(Error::EmptyOverlap {
                dataset: spec.name.clone(),
            });
        }
        Err(e) => return Err(e),
    };
    debug!("{}: peak density {peak:.4} before normalisation", spec.name);

    let lines = contour_levels(&grid, &config.levels);
    debug!("{}: {} contour line(s)", spec.name, lines.len());

    Ok(DatasetLayer {
        name: spec.name.clone(),
        total_rows: table.len(),
        kept_rows: filtered.len(),
        peak,
        grid,
        lines,
    })
}

/// Build the overlay figure for every configured dataset, in order.
pub fn build_figure(config: &PlotConfig) -> Result<Figure> {
    config.validate()?;
    let mut colors = ColorCycle::new(config.palette_colors()?)?;
    let mut figure = Figure::new(FigureStyle::from_config(config));

    for spec in &config.datasets {
        let layer = process_dataset(spec, config)?;
        let color = colors.next_color();
        figure.add_layer(&layer.name, &spec.label, color, layer.lines);
    }
    Ok(figure)
}

/// Build the figure and write both output files into `out_dir`.
pub fn run(config: &PlotConfig, out_dir: &Path) -> Result<ExportReport> {
    let figure = build_figure(config)?;
    export(
        figure,
        &config.raster_path(out_dir),
        &config.vector_path(out_dir),
        config.output.dpi,
    )
}
