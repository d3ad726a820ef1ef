//! Plot configuration.
//!
//! Every value has a built-in default reproducing the classic
//! potassium/sodium overlap figure, so the program runs without any
//! configuration file. A JSON file may override any subset of fields.

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::color::{generate_palette, parse_color};
use crate::error::{Error, Result};
use crate::grid::Extent;

/// Largest accepted bin count per axis.
pub const MAX_BINS: usize = 4096;
/// Largest accepted raster resolution.
pub const MAX_DPI: u32 = 2400;
/// Largest accepted raster side in pixels.
pub const MAX_RASTER_SIDE: f64 = 20_000.0;

/// One solution set to overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSpec {
    /// Short identifier used in log messages and errors.
    pub name: String,
    /// Solution-set file (`.csv`, `.json` or `.parquet`).
    pub path: PathBuf,
    /// Legend text.
    pub label: String,
}

impl DatasetSpec {
    pub fn new(name: &str, path: impl Into<PathBuf>, label: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            label: label.to_string(),
        }
    }
}

/// Output files and figure geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Raster file name, relative to the output directory.
    pub raster: PathBuf,
    /// Vector (EPS) file name, relative to the output directory.
    pub vector: PathBuf,
    /// Raster resolution in dots per inch.
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    /// Text size in points.
    pub font_size: f64,
    pub x_label: String,
    pub y_label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raster: PathBuf::from("contour_overlap.png"),
            vector: PathBuf::from("contour_overlap.eps"),
            dpi: 600,
            width_in: 6.4,
            height_in: 4.8,
            font_size: 15.0,
            x_label: "<E_e> (eV)".to_string(),
            y_label: "n_e (cm^-3)".to_string(),
        }
    }
}

/// Complete configuration of one overlap plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    /// Datasets in drawing (and legend) order.
    pub datasets: Vec<DatasetSpec>,
    /// Rows with `F` at or above this value are discarded.
    pub f_upper: f64,
    /// Normalised density levels to draw.
    pub levels: Vec<f64>,
    /// Histogram range, shared by all datasets.
    pub range: Extent,
    /// Bins per axis.
    pub bins: usize,
    /// Gaussian smoothing width in bins; 0 disables smoothing.
    pub smoothing_sigma: f64,
    /// Colour names or `#rrggbb` codes, cycled over the datasets. Empty means
    /// one generated hue per dataset.
    pub palette: Vec<String>,
    pub output: OutputConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            datasets: vec![
                DatasetSpec::new("k-9+", "./solution_set_k9+.csv", "K9+"),
                DatasetSpec::new("k-10+", "./solution_set_k10+.csv", "K10+"),
                DatasetSpec::new("na-7+", "./solution_set_na7+.csv", "Na7+"),
            ],
            f_upper: 1e-6,
            levels: vec![0.1],
            range: Extent::new(10.0, 10000.0, 1e11, 2.61e12),
            bins: 200,
            smoothing_sigma: 1.5,
            palette: vec!["black".to_string(), "red".to_string(), "blue".to_string()],
            output: OutputConfig::default(),
        }
    }
}

impl PlotConfig {
    /// Read a JSON configuration file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: PlotConfig = serde_json::from_str(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(Error::config("no datasets configured"));
        }
        if self.bins == 0 || self.bins > MAX_BINS {
            return Err(Error::config(format!(
                "bins must be between 1 and {MAX_BINS}, got {}",
                self.bins
            )));
        }
        self.range.validate()?;
        if self.range.x_min <= 0.0 || self.range.y_min <= 0.0 {
            return Err(Error::config(
                "histogram range must be positive on both axes (axes are logarithmic)",
            ));
        }
        // Keeps the kernel within the grid.
        if !(self.smoothing_sigma >= 0.0 && self.smoothing_sigma <= self.bins as f64) {
            return Err(Error::config(format!(
                "smoothing_sigma must be between 0 and bins ({}), got {}",
                self.bins, self.smoothing_sigma
            )));
        }
        if self.f_upper.is_nan() {
            return Err(Error::config("f_upper must be a number"));
        }
        if self.levels.is_empty() {
            return Err(Error::config("at least one contour level is required"));
        }
        if let Some(bad) = self.levels.iter().find(|l| !(**l > 0.0 && **l <= 1.0)) {
            return Err(Error::config(format!(
                "contour level {bad} is outside (0, 1]"
            )));
        }
        self.palette_colors()?;

        let out = &self.output;
        if out.dpi == 0 || out.dpi > MAX_DPI {
            return Err(Error::config(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                out.dpi
            )));
        }
        let dims = [out.width_in, out.height_in, out.font_size];
        if dims.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(Error::config(
                "figure width, height and font size must be positive",
            ));
        }
        let longest = out.width_in.max(out.height_in) * out.dpi as f64;
        if longest > MAX_RASTER_SIDE {
            return Err(Error::config(format!(
                "raster would be {longest:.0} px on its long side (limit {MAX_RASTER_SIDE})"
            )));
        }
        Ok(())
    }

    /// The palette to cycle through.
    pub fn palette_colors(&self) -> Result<Vec<RGBColor>> {
        if self.palette.is_empty() {
            return Ok(generate_palette(self.datasets.len()));
        }
        self.palette.iter().map(|c| parse_color(c)).collect()
    }

    pub fn raster_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.output.raster)
    }

    pub fn vector_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.output.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_the_classic_figure() {
        let config = PlotConfig::default();
        config.validate().unwrap();
        assert_eq!(config.datasets.len(), 3);
        assert_eq!(config.datasets[0].path, PathBuf::from("./solution_set_k9+.csv"));
        assert_eq!(config.f_upper, 1e-6);
        assert_eq!(config.levels, vec![0.1]);
        assert_eq!(config.range.as_array(), [10.0, 10000.0, 1e11, 2.61e12]);
        assert_eq!(config.bins, 200);
        assert_eq!(config.output.dpi, 600);
        assert_eq!(
            config.palette_colors().unwrap(),
            vec![RGBColor(0, 0, 0), RGBColor(255, 0, 0), RGBColor(0, 0, 255)]
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(
            &path,
            r#"{ "smoothing_sigma": 1.0, "output": { "dpi": 150 } }"#,
        )
        .unwrap();
        let config = PlotConfig::from_file(&path).unwrap();
        assert_eq!(config.smoothing_sigma, 1.0);
        assert_eq!(config.output.dpi, 150);
        assert_eq!(config.output.raster, PathBuf::from("contour_overlap.png"));
        assert_eq!(config.bins, 200);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(&path, r#"{ "smoothing": 1.0 }"#).unwrap();
        assert!(matches!(
            PlotConfig::from_file(&path).unwrap_err(),
            Error::Json { .. }
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = PlotConfig::default();
        config.smoothing_sigma = -0.5;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.range = Extent::new(0.0, 10.0, 1.0, 2.0);
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.levels = vec![0.1, 1.5];
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.palette = vec!["black".into(), "chartreuse-ish".into()];
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.datasets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_work_is_rejected() {
        let mut config = PlotConfig::default();
        config.smoothing_sigma = 1e9;
        assert!(matches!(config.validate().unwrap_err(), Error::InvalidConfig(_)));

        let mut config = PlotConfig::default();
        config.smoothing_sigma = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.output.dpi = 1_000_000;
        assert!(matches!(config.validate().unwrap_err(), Error::InvalidConfig(_)));

        let mut config = PlotConfig::default();
        config.bins = MAX_BINS + 1;
        assert!(config.validate().is_err());

        // 600 dpi is fine at 6.4 in, not at 64 in.
        let mut config = PlotConfig::default();
        config.output.width_in = 64.0;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.smoothing_sigma = 200.0;
        config.output.dpi = MAX_DPI;
        config.validate().unwrap();
    }

    #[test]
    fn empty_palette_generates_one_colour_per_dataset() {
        let mut config = PlotConfig::default();
        config.palette.clear();
        assert_eq!(config.palette_colors().unwrap().len(), 3);
    }
}
