use super::histogram::DensityGrid;
use crate::error::{Error, Result};

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Blur `grid` with a separable Gaussian of standard deviation `sigma` bins.
///
/// `sigma == 0` returns the grid untouched. Borders are handled by
/// reflecting about the edge, repeating the edge cell
/// (`d c b a | a b c d | d c b a`), so no mass leaks into implicit zeros.
pub fn gaussian_smooth(grid: &DensityGrid, sigma: f64) -> Result<DensityGrid> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::config(format!(
            "smoothing width must be a finite non-negative number, got {sigma}"
        )));
    }
    if sigma == 0.0 {
        return Ok(grid.clone());
    }

    let kernel = gaussian_kernel(sigma);
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut out = grid.clone();

    // Along x (within each row).
    let mut line = vec![0.0; nx];
    for j in 0..ny {
        for (i, slot) in line.iter_mut().enumerate() {
            *slot = grid.get(i, j);
        }
        let blurred = convolve_reflect(&line, &kernel);
        for (i, v) in blurred.into_iter().enumerate() {
            out.set(i, j, v);
        }
    }

    // Along y (within each column).
    let mut column = vec![0.0; ny];
    for i in 0..nx {
        for (j, slot) in column.iter_mut().enumerate() {
            *slot = out.get(i, j);
        }
        let blurred = convolve_reflect(&column, &kernel);
        for (j, v) in blurred.into_iter().enumerate() {
            out.set(i, j, v);
        }
    }

    Ok(out)
}

/// Normalised 1D Gaussian weights over `[-r, r]`, `r = floor(4 sigma + 0.5)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as i64;
    let two_var = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-(x * x) as f64 / two_var).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Map an out-of-range index back into `0..n` by mirror reflection that
/// repeats the edge sample.
fn reflect(idx: i64, n: usize) -> usize {
    let n = n as i64;
    let period = 2 * n;
    let m = idx.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

fn convolve_reflect(input: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = input.len();
    let radius = (kernel.len() / 2) as i64;
    (0..n as i64)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * input[reflect(i + k as i64 - radius, n)])
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::histogram::Extent;

    fn spike(n: usize, at: (usize, usize)) -> DensityGrid {
        let mut grid = DensityGrid::zeros(n, n, Extent::new(0.0, 1.0, 0.0, 1.0));
        grid.set(at.0, at.1, 1.0);
        grid
    }

    #[test]
    fn zero_width_is_a_pass_through() {
        let mut grid = spike(5, (2, 3));
        grid.set(0, 0, 0.25);
        let out = gaussian_smooth(&grid, 0.0).unwrap();
        assert_eq!(out, grid);
        assert_eq!(
            out.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            grid.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn kernel_is_normalised_with_expected_radius() {
        let k = gaussian_kernel(1.5);
        assert_eq!(k.len(), 13);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(k[0], k[12]);
        assert!(k[6] > k[5]);
        assert_eq!(gaussian_kernel(1.0).len(), 9);
    }

    #[test]
    fn reflection_repeats_edge_sample() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        // Wider than the signal: keep bouncing.
        assert_eq!(reflect(-5, 4), 3);
        assert_eq!(reflect(9, 1), 0);
    }

    #[test]
    fn interior_spike_spreads_symmetrically_and_keeps_mass() {
        let grid = spike(21, (10, 10));
        let out = gaussian_smooth(&grid, 1.5).unwrap();
        assert!((out.sum() - 1.0).abs() < 1e-12);
        assert!((out.get(9, 10) - out.get(11, 10)).abs() < 1e-15);
        assert!((out.get(10, 8) - out.get(8, 10)).abs() < 1e-15);
        assert_eq!(out.max(), out.get(10, 10));
        assert!(out.get(10, 10) < 1.0);
    }

    #[test]
    fn edge_spike_keeps_mass_through_reflection() {
        let grid = spike(8, (0, 0));
        let out = gaussian_smooth(&grid, 1.0).unwrap();
        assert!((out.sum() - 1.0).abs() < 1e-12);
        assert!(out.values().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn rejects_negative_or_nan_width() {
        let grid = spike(3, (1, 1));
        assert!(gaussian_smooth(&grid, -1.0).is_err());
        assert!(gaussian_smooth(&grid, f64::NAN).is_err());
    }
}
