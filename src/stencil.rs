//! Interior finite-difference stencil for D·w'''' + Δρ·g·w = −q
//!
//! Each operator row `i` couples `w[i-2] .. w[i+2]`. The five coefficients are
//! named by their offset: `l2` (−2), `l1` (−1), `c0` (0), `r1` (+1), `r2` (+2).
//!
//! Two representations are kept apart:
//! - [`StencilCoefficients`]: the unmodified per-cell coefficients. Boundary
//!   rules recombine these at the edges.
//! - [`CoefficientBands`]: the rows that will be assembled. Boundary rules
//!   overwrite edge rows here, and slots that reach beyond the domain are
//!   marked off-grid (`None`).

use crate::rigidity::PaddedRigidity;

/// Band offsets in storage order
pub const BAND_OFFSETS: [isize; 5] = [-2, -1, 0, 1, 2];

/// Farthest neighbour any stencil row reaches
pub const HALF_BANDWIDTH: usize = 2;

/// One coefficient slot; `None` marks an off-grid term that must never be assembled
pub type Coefficient = Option<f64>;

/// Physical constants shared by every stencil row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateConstants {
    /// Cell spacing (m)
    pub dx: f64,
    /// Density contrast (kg/m³)
    pub density_contrast: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
}

impl PlateConstants {
    pub fn new(dx: f64, density_contrast: f64, gravity: f64) -> Self {
        Self {
            dx,
            density_contrast,
            gravity,
        }
    }

    pub fn dx4(&self) -> f64 {
        self.dx.powi(4)
    }

    /// Restoring force per unit deflection, Δρ·g
    pub fn buoyancy(&self) -> f64 {
        self.density_contrast * self.gravity
    }
}

/// Whether the stencil came from a constant or a variable rigidity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StencilKind {
    /// `stiffness` is D/dx⁴
    Constant { stiffness: f64, buoyancy: f64 },
    Variable,
}

/// The five per-cell stencil coefficients, before any boundary rule
#[derive(Debug, Clone, PartialEq)]
pub struct StencilCoefficients {
    kind: StencilKind,
    pub l2: Vec<f64>,
    pub l1: Vec<f64>,
    pub c0: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
}

impl StencilCoefficients {
    /// (1, −4, 6, −4, 1)·D/dx⁴ with Δρ·g on the diagonal, broadcast to `nx` cells
    pub fn constant(rigidity: f64, constants: &PlateConstants, nx: usize) -> Self {
        let stiffness = rigidity / constants.dx4();
        let buoyancy = constants.buoyancy();
        Self {
            kind: StencilKind::Constant {
                stiffness,
                buoyancy,
            },
            l2: vec![stiffness; nx],
            l1: vec![-4.0 * stiffness; nx],
            c0: vec![6.0 * stiffness + buoyancy; nx],
            r1: vec![-4.0 * stiffness; nx],
            r2: vec![stiffness; nx],
        }
    }

    /// Second-order discretization of d²/dx²(D·d²w/dx²) from the shifted rigidity views
    pub fn variable(rigidity: &PaddedRigidity, constants: &PlateConstants) -> Self {
        let dx4 = constants.dx4();
        let buoyancy = constants.buoyancy();
        let nx = rigidity.nx();

        let mut stencil = Self {
            kind: StencilKind::Variable,
            l2: Vec::with_capacity(nx),
            l1: Vec::with_capacity(nx),
            c0: Vec::with_capacity(nx),
            r1: Vec::with_capacity(nx),
            r2: Vec::with_capacity(nx),
        };

        let views = rigidity
            .previous()
            .iter()
            .zip(rigidity.center())
            .zip(rigidity.next());
        for ((&dm1, &d0), &dp1) in views {
            stencil.l2.push((dm1 / 2.0 + d0 - dp1 / 2.0) / dx4);
            stencil.l1.push((-6.0 * d0 + 2.0 * dp1) / dx4);
            stencil
                .c0
                .push((-2.0 * dm1 + 10.0 * d0 - 2.0 * dp1) / dx4 + buoyancy);
            stencil.r1.push((2.0 * dm1 - 6.0 * d0) / dx4);
            stencil.r2.push((-dm1 / 2.0 + d0 + dp1 / 2.0) / dx4);
        }

        stencil
    }

    pub fn kind(&self) -> StencilKind {
        self.kind
    }

    pub fn nx(&self) -> usize {
        self.c0.len()
    }

    /// Coefficients of row `i` in offset order (−2 ..= +2)
    pub fn cell(&self, i: usize) -> [f64; 5] {
        [self.l2[i], self.l1[i], self.c0[i], self.r1[i], self.r2[i]]
    }
}

/// Operator rows ready for assembly, one slot per (row, offset)
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientBands {
    pub l2: Vec<Coefficient>,
    pub l1: Vec<Coefficient>,
    pub c0: Vec<Coefficient>,
    pub r1: Vec<Coefficient>,
    pub r2: Vec<Coefficient>,
}

impl CoefficientBands {
    /// Start from the interior stencil on every row
    pub fn from_stencil(stencil: &StencilCoefficients) -> Self {
        let wrap = |v: &[f64]| v.iter().copied().map(Some).collect::<Vec<_>>();
        Self {
            l2: wrap(&stencil.l2),
            l1: wrap(&stencil.l1),
            c0: wrap(&stencil.c0),
            r1: wrap(&stencil.r1),
            r2: wrap(&stencil.r2),
        }
    }

    pub fn nx(&self) -> usize {
        self.c0.len()
    }

    /// Row `i` in offset order (−2 ..= +2)
    pub fn row(&self, i: usize) -> [Coefficient; 5] {
        [self.l2[i], self.l1[i], self.c0[i], self.r1[i], self.r2[i]]
    }

    /// Overwrite row `i`, slots in offset order (−2 ..= +2)
    pub fn set_row(&mut self, i: usize, row: [Coefficient; 5]) {
        self.l2[i] = row[0];
        self.l1[i] = row[1];
        self.c0[i] = row[2];
        self.r1[i] = row[3];
        self.r2[i] = row[4];
    }

    /// Bands in [`BAND_OFFSETS`] order
    pub fn bands(&self) -> [&[Coefficient]; 5] {
        [&self.l2, &self.l1, &self.c0, &self.r1, &self.r2]
    }

    /// Number of slots marked off-grid
    pub fn off_grid_count(&self) -> usize {
        self.bands()
            .iter()
            .map(|band| band.iter().filter(|slot| slot.is_none()).count())
            .sum()
    }
}
