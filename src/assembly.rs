//! Assembly of the banded finite-difference operator
//!
//! Rows are laid out on diagonals the way a diagonal-storage constructor
//! expects: entry `j` of the diagonal with offset `k` lands at row `j - k`,
//! column `j`. Each band is therefore shifted so that row `i`'s coefficient
//! sits at column `i + k`. After the shift, every off-grid slot written by a
//! boundary rule falls outside the matrix. A slot that would still land inside
//! the matrix is reported as [`FlexureError::OffGridCoefficient`].

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;

use crate::boundary::{apply_boundary_conditions, BoundaryCondition};
use crate::diagnostics::Diagnostics;
use crate::error::{FlexureError, FlexureResult};
use crate::math::{roll, SparseMatrixBuilder};
use crate::rigidity::{PaddedRigidity, RigidityBoundary, RigidityField};
use crate::stencil::{
    Coefficient, CoefficientBands, PlateConstants, StencilCoefficients, BAND_OFFSETS,
};

/// Coefficient bands laid out as diagonals with their offsets
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalLayout {
    pub diagonals: Vec<Vec<Coefficient>>,
    pub offsets: Vec<isize>,
}

impl DiagonalLayout {
    /// Shift the bands into diagonal storage, adding the wraparound diagonals when periodic
    pub fn from_bands(bands: &CoefficientBands, periodic: bool) -> Self {
        let nx = bands.nx() as isize;

        let l2 = roll(&bands.l2, -2);
        let l1 = roll(&bands.l1, -1);
        let c0 = bands.c0.clone();
        let r1 = roll(&bands.r1, 1);
        let r2 = roll(&bands.r2, 2);

        if periodic {
            Self {
                diagonals: vec![
                    r1.clone(),
                    r2.clone(),
                    l2.clone(),
                    l1.clone(),
                    c0,
                    r1,
                    r2,
                    l2,
                    l1,
                ],
                offsets: vec![1 - nx, 2 - nx, -2, -1, 0, 1, 2, nx - 2, nx - 1],
            }
        } else {
            Self {
                diagonals: vec![l2, l1, c0, r1, r2],
                offsets: BAND_OFFSETS.to_vec(),
            }
        }
    }

    /// Build the square sparse matrix, refusing any off-grid slot inside it
    pub fn to_csr(&self, nx: usize) -> FlexureResult<CsrMatrix<f64>> {
        let mut builder = SparseMatrixBuilder::new(nx, self.offsets.len());

        for (diagonal, &offset) in self.diagonals.iter().zip(&self.offsets) {
            for (col, slot) in diagonal.iter().enumerate().take(nx) {
                let row = col as isize - offset;
                if row < 0 || row >= nx as isize {
                    continue;
                }
                let row = row as usize;
                match slot {
                    Some(value) => builder.add(row, col, *value),
                    None => return Err(FlexureError::OffGridCoefficient { row, col }),
                }
            }
        }

        Ok(builder.to_csr())
    }
}

/// The assembled `nx × nx` operator together with the bands it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatrix {
    csr: CsrMatrix<f64>,
    bands: CoefficientBands,
    offsets: Vec<isize>,
    periodic: bool,
}

impl CoefficientMatrix {
    /// Lay out the bands on diagonals and build the sparse matrix
    pub fn assemble(bands: CoefficientBands, periodic: bool) -> FlexureResult<Self> {
        let nx = bands.nx();
        let layout = DiagonalLayout::from_bands(&bands, periodic);
        let csr = layout.to_csr(nx)?;
        Ok(Self {
            csr,
            bands,
            offsets: layout.offsets,
            periodic,
        })
    }

    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.csr
    }

    /// Edge-rewritten bands, before the diagonal shift
    pub fn bands(&self) -> &CoefficientBands {
        &self.bands
    }

    /// Diagonal offsets used at assembly
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn nx(&self) -> usize {
        self.csr.nrows()
    }

    /// Distinct column-minus-row offsets holding a nonzero value
    pub fn nonzero_offsets(&self) -> BTreeSet<isize> {
        self.csr
            .triplet_iter()
            .filter(|(_, _, v)| **v != 0.0)
            .map(|(row, col, _)| col as isize - row as isize)
            .collect()
    }

    /// Dense copy (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.nx();
        let mut dense = DMatrix::zeros(n, n);
        for (row, col, &val) in self.csr.triplet_iter() {
            dense[(row, col)] += val;
        }
        dense
    }
}

/// Full finite-difference pipeline: rigidity → stencil → edge rows → matrix
pub fn assemble_operator(
    rigidity: &RigidityField,
    constants: &PlateConstants,
    nx: usize,
    west: BoundaryCondition,
    east: BoundaryCondition,
    diagnostics: &Diagnostics,
) -> FlexureResult<CoefficientMatrix> {
    rigidity.validate(nx)?;

    let stencil = match rigidity {
        RigidityField::Constant(d) => {
            diagnostics.debug(format_args!("Constant rigidity: no ghost cells needed"));
            StencilCoefficients::constant(*d, constants, nx)
        }
        RigidityField::Variable(d) => {
            let rule_west = RigidityBoundary::for_plate(west)?;
            let rule_east = RigidityBoundary::for_plate(east)?;
            let padded = PaddedRigidity::new(d, rule_west, rule_east)?;
            diagnostics.debug(format_args!(
                "Rigidity ghost cells ({rule_west:?}, {rule_east:?}): West {:.6e}, East {:.6e}",
                padded.values()[0],
                padded.values()[nx + 1]
            ));
            StencilCoefficients::variable(&padded, constants)
        }
    };

    let bands = CoefficientBands::from_stencil(&stencil);
    let bands = apply_boundary_conditions(bands, &stencil, west, east, diagnostics)?;

    let periodic = west == BoundaryCondition::Periodic || east == BoundaryCondition::Periodic;
    CoefficientMatrix::assemble(bands, periodic)
}
