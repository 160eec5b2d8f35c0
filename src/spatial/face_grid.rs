//! Bin grid over the far-radius square for nearest point-site lookup.
//!
//! Every point site is stored in the cell containing its position (clamped
//! to the grid). A query scans square rings of cells around its own cell
//! and stops once no unvisited ring can hold anything closer.

use crate::math::Point2;
use crate::topology::FaceId;

/// Grid of point-site faces keyed by site position.
#[derive(Debug, Clone)]
pub struct FaceGrid {
    cells: Vec<Vec<(Point2, FaceId)>>,
    n_bins: usize,
    min: f64,
    cell_size: f64,
    len: usize,
}

impl FaceGrid {
    /// Creates an empty grid of `n_bins × n_bins` cells covering
    /// `[-far_radius, far_radius]²`.
    #[must_use]
    pub fn new(far_radius: f64, n_bins: usize) -> Self {
        let n_bins = n_bins.max(1);
        #[allow(clippy::cast_precision_loss)]
        let cell_size = 2.0 * far_radius / n_bins as f64;
        Self {
            cells: vec![Vec::new(); n_bins * n_bins],
            n_bins,
            min: -far_radius,
            cell_size,
            len: 0,
        }
    }

    /// Map a coordinate to its (clamped) bin index.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn bin(&self, v: f64) -> usize {
        let i = ((v - self.min) / self.cell_size).floor();
        if i.is_nan() || i < 0.0 {
            0
        } else {
            (i as usize).min(self.n_bins - 1)
        }
    }

    fn cell_index(&self, ix: usize, iy: usize) -> usize {
        iy * self.n_bins + ix
    }

    /// Registers the face of a point site located at `position`.
    pub fn insert(&mut self, position: Point2, face: FaceId) {
        let idx = self.cell_index(self.bin(position.x), self.bin(position.y));
        self.cells[idx].push((position, face));
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the face whose site is nearest to `p`, with that distance.
    ///
    /// Exact for queries inside the grid square.
    #[must_use]
    pub fn nearest(&self, p: &Point2) -> Option<(FaceId, f64)> {
        if self.is_empty() {
            return None;
        }
        let (cx, cy) = (self.bin(p.x), self.bin(p.y));
        let mut best: Option<(FaceId, f64)> = None;

        for ring in 0..self.n_bins {
            self.scan_ring(cx, cy, ring, p, &mut best);
            // Cells in later rings are at least `ring * cell_size` away.
            #[allow(clippy::cast_precision_loss)]
            let bound = ring as f64 * self.cell_size;
            if let Some((_, d)) = best {
                if d <= bound {
                    break;
                }
            }
        }
        best
    }

    fn scan_ring(&self, cx: usize, cy: usize, ring: usize, p: &Point2, best: &mut Option<(FaceId, f64)>) {
        let lo_x = cx.saturating_sub(ring);
        let hi_x = (cx + ring).min(self.n_bins - 1);
        let lo_y = cy.saturating_sub(ring);
        let hi_y = (cy + ring).min(self.n_bins - 1);
        for iy in lo_y..=hi_y {
            for ix in lo_x..=hi_x {
                // Only the ring's border; the interior was scanned before.
                if ix.abs_diff(cx) != ring && iy.abs_diff(cy) != ring {
                    continue;
                }
                for (q, face) in &self.cells[self.cell_index(ix, iy)] {
                    let d = (q - p).norm();
                    if best.is_none_or(|(_, bd)| d < bd) {
                        *best = Some((*face, d));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use slotmap::SlotMap;

    #[test]
    fn empty_grid_has_no_nearest() {
        let grid = FaceGrid::new(1.0, 8);
        assert!(grid.nearest(&Point2::origin()).is_none());
    }

    #[test]
    fn nearest_matches_brute_force() {
        let mut faces: SlotMap<FaceId, ()> = SlotMap::with_key();
        let mut grid = FaceGrid::new(10.0, 7);
        let mut rng = StdRng::seed_from_u64(7);
        let mut stored = Vec::new();
        for _ in 0..200 {
            let p = Point2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            let f = faces.insert(());
            grid.insert(p, f);
            stored.push((p, f));
        }
        assert_eq!(grid.len(), 200);
        for _ in 0..100 {
            let q = Point2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            let (face, d) = grid.nearest(&q).unwrap();
            let brute = stored
                .iter()
                .map(|(p, _)| (p - q).norm())
                .fold(f64::INFINITY, f64::min);
            assert!((d - brute).abs() < 1e-12, "d={d} brute={brute}");
            assert!(stored.iter().any(|(p, f)| *f == face && ((p - q).norm() - d).abs() < 1e-12));
        }
    }

    #[test]
    fn points_outside_the_square_are_clamped() {
        let mut faces: SlotMap<FaceId, ()> = SlotMap::with_key();
        let mut grid = FaceGrid::new(1.0, 4);
        let far = faces.insert(());
        let near = faces.insert(());
        grid.insert(Point2::new(0.0, 3.0), far);
        grid.insert(Point2::new(0.9, -0.9), near);
        let (face, _) = grid.nearest(&Point2::new(0.0, 0.9)).unwrap();
        assert_eq!(face, near);
        let (face, _) = grid.nearest(&Point2::new(0.0, 0.99)).unwrap();
        assert_eq!(face, far);
    }
}
