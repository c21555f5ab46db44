//! Grid geometry and applied loads

use serde::{Deserialize, Serialize};

/// Regular 1D grid: `nx` cells spaced `dx` apart, starting at x = 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Cell spacing (m)
    pub dx: f64,
    /// Number of cells
    pub nx: usize,
}

impl Grid {
    pub fn new(dx: f64, nx: usize) -> Self {
        Self { dx, nx }
    }

    /// Cell positions `x[i] = i·dx`
    pub fn positions(&self) -> Vec<f64> {
        (0..self.nx).map(|i| i as f64 * self.dx).collect()
    }
}

/// A load at an arbitrary position, for non-gridded superposition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Position along the profile (m)
    pub position: f64,
    /// Load magnitude (positive pushes the plate down)
    pub magnitude: f64,
}

impl PointLoad {
    pub fn new(position: f64, magnitude: f64) -> Self {
        Self {
            position,
            magnitude,
        }
    }
}

/// Applied vertical load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadField {
    /// One value per grid cell
    Gridded(Vec<f64>),
    /// Loads at scattered positions; these positions replace the grid's
    Scattered(Vec<PointLoad>),
}

impl LoadField {
    /// Number of load samples
    pub fn len(&self) -> usize {
        match self {
            Self::Gridded(q) => q.len(),
            Self::Scattered(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_gridded(&self) -> bool {
        matches!(self, Self::Gridded(_))
    }

    /// A gridded load that is zero everywhere except `magnitude` at cell `i0`
    pub fn point(nx: usize, i0: usize, magnitude: f64) -> Self {
        let mut q = vec![0.0; nx];
        if let Some(cell) = q.get_mut(i0) {
            *cell = magnitude;
        }
        Self::Gridded(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let grid = Grid::new(250.0, 4);
        assert_eq!(grid.positions(), vec![0.0, 250.0, 500.0, 750.0]);
    }

    #[test]
    fn test_point_load() {
        let load = LoadField::point(5, 2, 3.0);
        assert_eq!(load, LoadField::Gridded(vec![0.0, 0.0, 3.0, 0.0, 0.0]));
        assert_eq!(load.len(), 5);
        assert!(load.is_gridded());
    }
}
