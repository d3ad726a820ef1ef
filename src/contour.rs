//! Iso-line extraction with marching squares.
//!
//! Cell values sit at cell centres, so for a grid over `[xmin, xmax]` with
//! `nx` columns the first sample is at `xmin + dx / 2`. Each square of four
//! neighbouring samples contributes at most two segments; segments are then
//! joined through the grid edges they share into polylines.

use std::collections::HashMap;

use crate::grid::DensityGrid;

/// One iso-line in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<(f64, f64)>,
    /// `true` when the line is a loop (first point repeated at the end).
    pub closed: bool,
}

/// A crossing point is identified by the grid edge it lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum EdgeKey {
    /// Edge from sample `(i, j)` to `(i + 1, j)`.
    Horizontal(usize, usize),
    /// Edge from sample `(i, j)` to `(i, j + 1)`.
    Vertical(usize, usize),
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: EdgeKey,
    b: EdgeKey,
}

impl Segment {
    fn other(&self, end: EdgeKey) -> EdgeKey {
        if self.a == end {
            self.b
        } else {
            self.a
        }
    }
}

/// Extract the iso-lines of `grid` at `level`.
///
/// A sample counts as inside when it is `>= level`. Saddle squares are
/// resolved with the mean of their four corners. Lines that reach the grid
/// border are open; all others are closed.
pub fn contour_lines(grid: &DensityGrid, level: f64) -> Vec<ContourLine> {
    let (nx, ny) = (grid.nx(), grid.ny());
    if nx < 2 || ny < 2 || !level.is_finite() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut crossings: HashMap<EdgeKey, (f64, f64)> = HashMap::new();

    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            // a: lower-left, b: lower-right, c: upper-right, d: upper-left
            let a = grid.get(i, j);
            let b = grid.get(i + 1, j);
            let c = grid.get(i + 1, j + 1);
            let d = grid.get(i, j + 1);
            if a.is_nan() || b.is_nan() || c.is_nan() || d.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if a >= level {
                case |= 1;
            }
            if b >= level {
                case |= 2;
            }
            if c >= level {
                case |= 4;
            }
            if d >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let bottom = EdgeKey::Horizontal(i, j);
            let top = EdgeKey::Horizontal(i, j + 1);
            let left = EdgeKey::Vertical(i, j);
            let right = EdgeKey::Vertical(i + 1, j);

            let centre_inside = (a + b + c + d) / 4.0 >= level;
            let (first, second) = match case {
                1 | 14 => ((left, bottom), None),
                2 | 13 => ((bottom, right), None),
                3 | 12 => ((left, right), None),
                4 | 11 => ((right, top), None),
                6 | 9 => ((bottom, top), None),
                7 | 8 => ((left, top), None),
                5 if centre_inside => ((bottom, right), Some((left, top))),
                5 => ((left, bottom), Some((right, top))),
                10 if centre_inside => ((left, bottom), Some((right, top))),
                _ => ((bottom, right), Some((left, top))),
            };

            for (p, q) in std::iter::once(first).chain(second) {
                for key in [p, q] {
                    crossings
                        .entry(key)
                        .or_insert_with(|| crossing_point(grid, key, level));
                }
                segments.push(Segment { a: p, b: q });
            }
        }
    }

    let lines = join_segments(&segments);
    lines
        .into_iter()
        .map(|keys| {
            let closed = keys.len() > 2 && keys.first() == keys.last();
            let points = keys
                .iter()
                .map(|k| crossings.get(k).copied().unwrap_or((f64::NAN, f64::NAN)))
                .collect();
            ContourLine {
                level,
                points,
                closed,
            }
        })
        .collect()
}

/// Extract lines for every level, in level order.
pub fn contour_levels(grid: &DensityGrid, levels: &[f64]) -> Vec<ContourLine> {
    levels
        .iter()
        .flat_map(|&level| contour_lines(grid, level))
        .collect()
}

/// Linear interpolation of `level` along the edge `key`, in data coordinates.
fn crossing_point(grid: &DensityGrid, key: EdgeKey, level: f64) -> (f64, f64) {
    let (i, j, di, dj) = match key {
        EdgeKey::Horizontal(i, j) => (i, j, 1, 0),
        EdgeKey::Vertical(i, j) => (i, j, 0, 1),
    };
    let v0 = grid.get(i, j);
    let v1 = grid.get(i + di, j + dj);
    let t = if v1 == v0 {
        0.5
    } else {
        ((level - v0) / (v1 - v0)).clamp(0.0, 1.0)
    };
    let gx = i as f64 + t * di as f64;
    let gy = j as f64 + t * dj as f64;
    (grid.x_at(gx), grid.y_at(gy))
}

/// Chain segments that share an edge crossing into ordered key lists.
///
/// Every interior crossing is shared by exactly two segments, so walking from
/// a crossing used once (a border end) yields an open line, and whatever is
/// left afterwards forms loops.
fn join_segments(segments: &[Segment]) -> Vec<Vec<EdgeKey>> {
    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (idx, seg) in segments.iter().enumerate() {
        by_edge.entry(seg.a).or_default().push(idx);
        by_edge.entry(seg.b).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    let mut open_ends: Vec<EdgeKey> = by_edge
        .iter()
        .filter(|(_, segs)| segs.len() == 1)
        .map(|(key, _)| *key)
        .collect();
    open_ends.sort();

    for start in open_ends {
        let first = by_edge[&start][0];
        if used[first] {
            continue;
        }
        lines.push(walk(segments, &by_edge, &mut used, start, first));
    }

    for idx in 0..segments.len() {
        if !used[idx] {
            lines.push(walk(segments, &by_edge, &mut used, segments[idx].a, idx));
        }
    }

    lines
}

fn walk(
    segments: &[Segment],
    by_edge: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
    start: EdgeKey,
    first: usize,
) -> Vec<EdgeKey> {
    let mut keys = vec![start];
    let mut at = start;
    let mut seg = first;
    loop {
        used[seg] = true;
        at = segments[seg].other(at);
        keys.push(at);
        let next = by_edge
            .get(&at)
            .and_then(|segs| segs.iter().copied().find(|&s| !used[s]));
        match next {
            Some(s) => seg = s,
            None => break,
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Extent;

    fn grid(nx: usize, ny: usize, values: Vec<f64>) -> DensityGrid {
        DensityGrid::from_rows(
            nx,
            ny,
            values,
            Extent::new(0.0, nx as f64, 0.0, ny as f64),
        )
        .unwrap()
    }

    #[test]
    fn flat_grid_has_no_lines() {
        let g = grid(3, 3, vec![0.5; 9]);
        assert!(contour_lines(&g, 0.1).is_empty());
        assert!(contour_lines(&g, 0.9).is_empty());
    }

    #[test]
    fn interior_peak_gives_one_closed_loop() {
        #[rustfmt::skip]
        let g = grid(3, 3, vec![
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ]);
        let lines = contour_lines(&g, 0.5);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line.closed);
        assert_eq!(line.level, 0.5);
        // Four crossings plus the repeated start.
        assert_eq!(line.points.len(), 5);
        assert_eq!(line.points.first(), line.points.last());
        // Crossings sit halfway between the centre sample (1.5, 1.5) and its
        // neighbours.
        for &(x, y) in &line.points[..4] {
            let r = ((x - 1.5).abs(), (y - 1.5).abs());
            assert!(
                (r.0 == 0.5 && r.1 == 0.0) || (r.0 == 0.0 && r.1 == 0.5),
                "unexpected crossing ({x}, {y})"
            );
        }
    }

    #[test]
    fn region_touching_border_gives_open_line() {
        #[rustfmt::skip]
        let g = grid(3, 2, vec![
            1.0, 1.0, 0.0,
            1.0, 1.0, 0.0,
        ]);
        let lines = contour_lines(&g, 0.5);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(!line.closed);
        assert_eq!(line.points.len(), 2);
        for &(x, _) in &line.points {
            assert_eq!(x, 2.0);
        }
    }

    #[test]
    fn two_separate_peaks_give_two_loops() {
        #[rustfmt::skip]
        let g = grid(5, 3, vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let lines = contour_lines(&g, 0.1);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.closed));
    }

    /// Quadrant of a point on a 2x2 grid whose samples sit at 0.5 and 1.5.
    fn quadrant((x, y): (f64, f64)) -> (bool, bool) {
        (x > 1.0, y > 1.0)
    }

    fn segment_quadrants(lines: &[ContourLine]) -> Vec<(bool, bool)> {
        let mut quadrants: Vec<_> = lines
            .iter()
            .map(|line| {
                assert_eq!(line.points.len(), 2);
                let q = quadrant(line.points[0]);
                assert_eq!(q, quadrant(line.points[1]), "segment crosses quadrants");
                q
            })
            .collect();
        quadrants.sort();
        quadrants
    }

    #[test]
    fn saddle_with_high_centre_joins_the_high_corners() {
        // Lower-left and upper-right high, centre mean 0.6 >= 0.5: the
        // segments cut off the two low corners.
        let g = grid(2, 2, vec![1.0, 0.2, 0.2, 1.0]);
        let lines = contour_lines(&g, 0.5);
        assert_eq!(lines.len(), 2);
        assert_eq!(segment_quadrants(&lines), [(false, true), (true, false)]);

        let mut points: Vec<_> = lines.iter().flat_map(|l| l.points.clone()).collect();
        points.sort_by(|p, q| p.partial_cmp(q).unwrap());
        let expected = [(0.5, 1.125), (0.875, 1.5), (1.125, 0.5), (1.5, 0.875)];
        for (got, want) in points.iter().zip(expected) {
            assert!(
                (got.0 - want.0).abs() < 1e-12 && (got.1 - want.1).abs() < 1e-12,
                "crossing {got:?}, expected {want:?}"
            );
        }
    }

    #[test]
    fn saddle_with_low_centre_isolates_the_high_corners() {
        // Same layout, centre mean 0.3 < 0.5: each high corner gets its own
        // segment.
        let g = grid(2, 2, vec![0.6, 0.0, 0.0, 0.6]);
        let lines = contour_lines(&g, 0.5);
        assert_eq!(lines.len(), 2);
        assert_eq!(segment_quadrants(&lines), [(false, false), (true, true)]);
    }

    #[test]
    fn mirrored_saddle_follows_the_same_rule() {
        // Lower-right and upper-left high.
        let joined = grid(2, 2, vec![0.2, 1.0, 1.0, 0.2]);
        assert_eq!(
            segment_quadrants(&contour_lines(&joined, 0.5)),
            [(false, false), (true, true)]
        );
        let split = grid(2, 2, vec![0.0, 0.6, 0.6, 0.0]);
        assert_eq!(
            segment_quadrants(&contour_lines(&split, 0.5)),
            [(false, true), (true, false)]
        );
    }

    #[test]
    fn multiple_levels_are_concatenated_in_order() {
        #[rustfmt::skip]
        let g = grid(3, 3, vec![
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ]);
        let lines = contour_levels(&g, &[0.1, 0.9]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].level, 0.1);
        assert_eq!(lines[1].level, 0.9);
    }
}
