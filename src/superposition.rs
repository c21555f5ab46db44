//! Superposition of analytical point-load solutions
//!
//! For a line load on an infinite elastic plate over an inviscid fluid, the
//! deflection at distance `r` from the load is
//!
//! ```text
//! w(r) = −q·dx · α³/(8D) · exp(−r/α) · (cos(r/α) + sin(r/α))
//! ```
//!
//! Summing this response over every load sample gives the deflection without
//! building or solving a matrix. Each output position is an independent sum
//! over the loads, taken in load order. With the `parallel` feature the
//! output positions are computed on the rayon pool, and results stay
//! bit-for-bit identical to the sequential path.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, PointLoad};
use crate::rigidity::{flexural_parameter, flexural_rigidity};

/// Material-derived constants of the point-load response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperpositionParams {
    /// Flexural rigidity D
    pub rigidity: f64,
    /// Flexural parameter α
    pub alpha: f64,
    /// α³ / (8D)
    pub coeff: f64,
}

impl SuperpositionParams {
    pub fn new(rigidity: f64, density_contrast: f64, gravity: f64) -> Self {
        let alpha = flexural_parameter(rigidity, density_contrast, gravity);
        Self {
            rigidity,
            alpha,
            coeff: alpha.powi(3) / (8.0 * rigidity),
        }
    }

    pub fn from_elastic_thickness(
        te: f64,
        youngs_modulus: f64,
        poissons_ratio: f64,
        density_contrast: f64,
        gravity: f64,
    ) -> Self {
        let d = flexural_rigidity(youngs_modulus, poissons_ratio, te);
        Self::new(d, density_contrast, gravity)
    }

    /// Upward deflection per unit load·length at distance `dist`
    #[inline]
    pub fn response(&self, dist: f64) -> f64 {
        let s = dist.abs() / self.alpha;
        self.coeff * (-s).exp() * (s.cos() + s.sin())
    }
}

/// Deflection at `x` from every `(position, load)` source, each weighted by `dx`
#[inline]
fn deflection_at(x: f64, sources: &[(f64, f64)], dx: f64, params: &SuperpositionParams) -> f64 {
    let mut w = 0.0;
    for &(x0, q) in sources {
        // Positive load deflects downward
        w -= q * dx * params.response(x - x0);
    }
    w
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn accumulate_sequential(
    targets: &[f64],
    sources: &[(f64, f64)],
    dx: f64,
    params: &SuperpositionParams,
) -> Vec<f64> {
    targets
        .iter()
        .map(|&x| deflection_at(x, sources, dx, params))
        .collect()
}

#[cfg(feature = "parallel")]
fn accumulate_parallel(
    targets: &[f64],
    sources: &[(f64, f64)],
    dx: f64,
    params: &SuperpositionParams,
) -> Vec<f64> {
    targets
        .par_iter()
        .map(|&x| deflection_at(x, sources, dx, params))
        .collect()
}

/// Sum the responses of all sources at all targets, in parallel when available
fn accumulate(
    targets: &[f64],
    sources: &[(f64, f64)],
    dx: f64,
    params: &SuperpositionParams,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        accumulate_parallel(targets, sources, dx, params)
    }
    #[cfg(not(feature = "parallel"))]
    {
        accumulate_sequential(targets, sources, dx, params)
    }
}

/// Deflection on a regular grid; cells without load contribute nothing
pub fn superpose_gridded(load: &[f64], grid: &Grid, params: &SuperpositionParams) -> Vec<f64> {
    let x = grid.positions();
    let sources: Vec<(f64, f64)> = x
        .iter()
        .zip(load)
        .filter(|(_, q)| **q != 0.0)
        .map(|(&x0, &q)| (x0, q))
        .collect();
    accumulate(&x, &sources, grid.dx, params)
}

/// Deflection at scattered load positions, which are also the output positions
///
/// Returns `(x, w)`. Every pair is evaluated against every other pair.
pub fn superpose_scattered(
    points: &[PointLoad],
    dx: f64,
    params: &SuperpositionParams,
) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = points.iter().map(|p| p.position).collect();
    let sources: Vec<(f64, f64)> = points.iter().map(|p| (p.position, p.magnitude)).collect();
    let w = accumulate(&x, &sources, dx, params);
    (x, w)
}
