//! Direct solve of the assembled operator against the load

use nalgebra::DVector;

use crate::assembly::CoefficientMatrix;
use crate::error::{FlexureError, FlexureResult};
use crate::math::{sparse_matvec, BandedLuSolver, CyclicBandedSolver};
use crate::stencil::HALF_BANDWIDTH;

/// Largest accepted ‖A·w + q‖ / ‖q‖
pub const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Solve `A·w = −q`; positive load gives downward (negative) deflection
pub fn solve_deflection(matrix: &CoefficientMatrix, load: &[f64]) -> FlexureResult<Vec<f64>> {
    let n = matrix.nx();
    if load.len() != n {
        return Err(FlexureError::LoadMismatch(format!(
            "load has {} cells, operator has {n}",
            load.len()
        )));
    }

    let rhs = DVector::from_iterator(n, load.iter().map(|q| -q));
    let w = if matrix.is_periodic() {
        // Wraparound corners stay out of the band
        CyclicBandedSolver::new(matrix.csr(), HALF_BANDWIDTH)?.solve(&rhs)?
    } else {
        let mut lu = BandedLuSolver::new(matrix.csr());
        lu.factorize()?;
        lu.solve(&rhs)?
    };

    if let Some(i) = w.iter().position(|v| !v.is_finite()) {
        return Err(FlexureError::SolveFailed(format!(
            "non-finite deflection at cell {i}"
        )));
    }

    let rhs_norm = rhs.norm();
    if rhs_norm > 0.0 {
        let residual = (sparse_matvec(matrix.csr(), &w) - &rhs).norm() / rhs_norm;
        if !(residual <= RESIDUAL_TOLERANCE) {
            return Err(FlexureError::SolveFailed(format!(
                "relative residual {residual:.3e} exceeds {RESIDUAL_TOLERANCE:.0e}"
            )));
        }
    }

    Ok(w.as_slice().to_vec())
}
