//! Density grids: binning, smoothing and normalisation of `(E, n)` points.

pub mod histogram;
pub mod normalize;
pub mod smooth;

pub use histogram::{bin_edges, histogram_2d, DensityGrid, Extent};
pub use normalize::normalize;
pub use smooth::gaussian_smooth;
