//! Overlap contour plots of plasma solution-set densities.
//!
//! Each solution set is a table of electron energy `E`, electron density `n`
//! and a fit residual `F`. Rows with a small enough residual are binned on a
//! fixed grid, smoothed, normalised to a peak of one and traced at a fixed
//! level; the contours of every set are overlaid on one log-log figure that
//! is written as a high-resolution PNG and an EPS file.
//!
//! ```text
//!   file ─► data::load_file ─► data::filter_below ─► grid::histogram_2d
//!        ─► grid::gaussian_smooth ─► grid::normalize ─► contour::contour_levels
//!        ─► figure::Figure ─► render::export
//! ```

pub mod color;
pub mod config;
pub mod contour;
pub mod data;
pub mod error;
pub mod figure;
pub mod grid;
pub mod pipeline;
pub mod render;

pub use error::{Error, Result};
