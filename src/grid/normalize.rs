use super::histogram::DensityGrid;
use crate::error::{Error, Result};

/// Scale `grid` in place so its largest cell becomes exactly 1.0.
///
/// Returns the original peak. An all-zero grid fails with
/// [`Error::EmptyGrid`] before anything is divided, so the grid is left
/// untouched and never picks up NaN or infinities.
pub fn normalize(grid: &mut DensityGrid) -> Result<f64> {
    let peak = grid.max();
    if peak == 0.0 {
        return Err(Error::EmptyGrid);
    }
    for v in grid.values_mut() {
        *v /= peak;
    }
    Ok(peak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::histogram::Extent;

    fn grid(values: Vec<f64>) -> DensityGrid {
        DensityGrid::from_rows(3, 2, values, Extent::new(0.0, 3.0, 0.0, 2.0)).unwrap()
    }

    #[test]
    fn peak_becomes_one() {
        let mut g = grid(vec![0.0, 3.0, 1.5, 0.3, 0.0, 2.9999]);
        let peak = normalize(&mut g).unwrap();
        assert_eq!(peak, 3.0);
        assert_eq!(g.max(), 1.0);
        assert_eq!(g.get(2, 0), 0.5);
    }

    #[test]
    fn already_normalised_grid_is_stable() {
        let mut g = grid(vec![0.1, 1.0, 0.2, 0.0, 0.7, 0.4]);
        let before = g.clone();
        normalize(&mut g).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn tiny_peak_still_reaches_one() {
        let mut g = grid(vec![1e-300, 0.0, 0.0, 5e-301, 0.0, 0.0]);
        normalize(&mut g).unwrap();
        assert!((g.max() - 1.0).abs() <= f64::EPSILON);
        assert!(g.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_grid_aborts_without_dividing() {
        let mut g = grid(vec![0.0; 6]);
        let err = normalize(&mut g).unwrap_err();
        assert!(matches!(err, Error::EmptyGrid));
        assert!(err.is_empty_overlap());
        assert!(g.values().iter().all(|v| *v == 0.0));
    }
}
