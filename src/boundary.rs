//! Plate boundary conditions and the edge-row rewrites that encode them
//!
//! Each side of the plate selects one [`BoundaryCondition`] independently.
//! The condition is enforced by rewriting the two operator rows nearest to
//! that edge. Every rule is written once, from the point of view of the edge:
//! `far_out`/`near_out` are the slots reaching two/one cells toward the
//! boundary, and `near_in`/`far_in` reach into the domain. [`Side`] maps that
//! view onto the West (index 0) or East (index nx − 1) rows.
//!
//! Slots that would address a node beyond the edge are marked off-grid
//! (`None`). Assembly shifts them outside the matrix and refuses to read them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::{FlexureError, FlexureResult};
use crate::stencil::{Coefficient, CoefficientBands, StencilCoefficients, StencilKind};

/// Physical condition at one end of the plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Wrap around to the opposite edge (must be chosen on both sides)
    Periodic,
    /// Zero deflection beyond the edge
    Dirichlet0,
    /// Free edge: zero curvature and zero third derivative (broken plate)
    #[serde(rename = "0Moment0Shear")]
    ZeroMomentZeroShear,
    /// Zero slope and zero third derivative
    #[serde(rename = "0Slope0Shear")]
    ZeroSlopeZeroShear,
    /// Symmetry about the edge cell
    Mirror,
    /// Zero first derivative; no row rule is defined for it
    Neumann,
}

impl BoundaryCondition {
    /// External label of the condition
    pub fn label(&self) -> &'static str {
        match self {
            Self::Periodic => "Periodic",
            Self::Dirichlet0 => "Dirichlet0",
            Self::ZeroMomentZeroShear => "0Moment0Shear",
            Self::ZeroSlopeZeroShear => "0Slope0Shear",
            Self::Mirror => "Mirror",
            Self::Neumann => "Neumann",
        }
    }

    /// Edge rule enforcing this condition
    pub fn rule(&self) -> &'static dyn EdgeRule {
        EDGE_RULES[*self as usize]
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BoundaryCondition {
    type Err = FlexureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Periodic" => Ok(Self::Periodic),
            "Dirichlet0" => Ok(Self::Dirichlet0),
            "0Moment0Shear" => Ok(Self::ZeroMomentZeroShear),
            "0Slope0Shear" => Ok(Self::ZeroSlopeZeroShear),
            "Mirror" => Ok(Self::Mirror),
            "Neumann" => Ok(Self::Neumann),
            // Nonzero Dirichlet and the developer sandbox are reserved names
            "Dirichlet" | "Sandbox" => Err(FlexureError::UnsupportedBoundaryCondition(
                s.to_string(),
            )),
            other => Err(FlexureError::UnknownBoundaryCondition(other.to_string())),
        }
    }
}

/// End of the plate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    West,
    East,
}

impl Side {
    /// Row indices of the outermost and second-from-edge rows
    pub fn edge_rows(&self, nx: usize) -> [usize; 2] {
        match self {
            Self::West => [0, 1],
            Self::East => [nx - 1, nx - 2],
        }
    }

    /// View a row in offset order (−2 ..= +2) from this edge
    pub fn orient(&self, cell: [f64; 5]) -> EdgeCell {
        let [l2, l1, c0, r1, r2] = cell;
        match self {
            Self::West => EdgeCell {
                far_out: l2,
                near_out: l1,
                center: c0,
                near_in: r1,
                far_in: r2,
            },
            Self::East => EdgeCell {
                far_out: r2,
                near_out: r1,
                center: c0,
                near_in: l1,
                far_in: l2,
            },
        }
    }

    /// Put an edge-oriented row back in offset order (−2 ..= +2)
    pub fn place(&self, row: EdgeRow) -> [Coefficient; 5] {
        match self {
            Self::West => [row.far_out, row.near_out, row.center, row.near_in, row.far_in],
            Self::East => [row.far_in, row.near_in, row.center, row.near_out, row.far_out],
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::West => f.write_str("West"),
            Self::East => f.write_str("East"),
        }
    }
}

/// Interior stencil of one cell, seen from a boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCell {
    pub far_out: f64,
    pub near_out: f64,
    pub center: f64,
    pub near_in: f64,
    pub far_in: f64,
}

/// A rewritten operator row, seen from a boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRow {
    pub far_out: Coefficient,
    pub near_out: Coefficient,
    pub center: Coefficient,
    pub near_in: Coefficient,
    pub far_in: Coefficient,
}

impl EdgeRow {
    /// Row whose two outward slots are off-grid
    fn outermost(center: f64, near_in: f64, far_in: f64) -> Self {
        Self {
            far_out: None,
            near_out: None,
            center: Some(center),
            near_in: Some(near_in),
            far_in: Some(far_in),
        }
    }

    /// Row whose far outward slot is off-grid
    fn second(near_out: f64, center: f64, near_in: f64, far_in: f64) -> Self {
        Self {
            far_out: None,
            near_out: Some(near_out),
            center: Some(center),
            near_in: Some(near_in),
            far_in: Some(far_in),
        }
    }
}

/// Everything an edge rule may read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeContext {
    pub kind: StencilKind,
    /// Interior stencil of the outermost row
    pub outer: EdgeCell,
    /// Interior stencil of the second-from-edge row
    pub inner: EdgeCell,
}

/// Rewrites the edge rows of the operator for one boundary condition
pub trait EdgeRule {
    fn condition(&self) -> BoundaryCondition;

    /// New `[outermost, second]` rows, or `None` to keep the interior stencil
    fn rewrite(&self, edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>>;
}

/// Indexed by `BoundaryCondition as usize`
const EDGE_RULES: [&dyn EdgeRule; 6] = [
    &PeriodicRule,
    &DirichletZeroRule,
    &ZeroMomentZeroShearRule,
    &ZeroSlopeZeroShearRule,
    &MirrorRule,
    &NeumannRule,
];

/// Wraparound is added at assembly time; the rows stay interior
struct PeriodicRule;

impl EdgeRule for PeriodicRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::Periodic
    }

    fn rewrite(&self, _edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        Ok(None)
    }
}

/// Terms beyond the edge fall outside the matrix and so act as w = 0
struct DirichletZeroRule;

impl EdgeRule for DirichletZeroRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::Dirichlet0
    }

    fn rewrite(&self, _edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        Ok(None)
    }
}

/// w'' = w''' = 0 at the edge
struct ZeroMomentZeroShearRule;

impl EdgeRule for ZeroMomentZeroShearRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::ZeroMomentZeroShear
    }

    fn rewrite(&self, edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        let rows = match edge.kind {
            StencilKind::Constant {
                stiffness: k,
                buoyancy: b,
            } => [
                EdgeRow::outermost(2.0 * k + b, -4.0 * k, 2.0 * k),
                EdgeRow::second(-2.0 * k, 6.0 * k + b, -6.0 * k, 2.0 * k),
            ],
            StencilKind::Variable => {
                let o = edge.outer;
                let i = edge.inner;
                [
                    EdgeRow::outermost(
                        o.center + 4.0 * o.far_out + 2.0 * o.near_out,
                        o.near_in - 4.0 * o.far_out - o.near_out,
                        o.far_in + o.far_out,
                    ),
                    EdgeRow::second(
                        i.near_out + 2.0 * i.far_out,
                        i.center,
                        i.near_in - 2.0 * i.far_out,
                        i.far_in + i.far_out,
                    ),
                ]
            }
        };
        Ok(Some(rows))
    }
}

/// w' = w''' = 0: the zero gradient is extended two cells past the edge
struct ZeroSlopeZeroShearRule;

impl EdgeRule for ZeroSlopeZeroShearRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::ZeroSlopeZeroShear
    }

    fn rewrite(&self, edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        let rows = match edge.kind {
            StencilKind::Constant {
                stiffness: k,
                buoyancy: b,
            } => [
                EdgeRow::outermost(6.0 * k + b, -8.0 * k, 2.0 * k),
                EdgeRow::second(-4.0 * k, 6.0 * k + b, -4.0 * k, 2.0 * k),
            ],
            StencilKind::Variable => {
                let o = edge.outer;
                let i = edge.inner;
                [
                    EdgeRow::outermost(o.center, o.near_in + o.near_out, o.far_in + o.far_out),
                    EdgeRow::second(i.near_out, i.center, i.near_in, i.far_in + i.far_out),
                ]
            }
        };
        Ok(Some(rows))
    }
}

/// Off-grid nodes take the value of their reflection about the edge cell
struct MirrorRule;

impl EdgeRule for MirrorRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::Mirror
    }

    fn rewrite(&self, edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        let rows = match edge.kind {
            StencilKind::Constant {
                stiffness: k,
                buoyancy: b,
            } => [
                EdgeRow::outermost(6.0 * k + b, -8.0 * k, 2.0 * k),
                EdgeRow::second(-4.0 * k, 7.0 * k + b, -4.0 * k, k),
            ],
            StencilKind::Variable => {
                let o = edge.outer;
                let i = edge.inner;
                [
                    EdgeRow::outermost(o.center, o.near_in + o.near_out, o.far_in + o.far_out),
                    EdgeRow::second(i.near_out, i.center + i.far_out, i.near_in, i.far_in),
                ]
            }
        };
        Ok(Some(rows))
    }
}

struct NeumannRule;

impl EdgeRule for NeumannRule {
    fn condition(&self) -> BoundaryCondition {
        BoundaryCondition::Neumann
    }

    fn rewrite(&self, _edge: &EdgeContext) -> FlexureResult<Option<[EdgeRow; 2]>> {
        Err(FlexureError::UnsupportedBoundaryCondition(
            BoundaryCondition::Neumann.to_string(),
        ))
    }
}

/// Periodic wraparound only makes sense when both edges wrap
pub fn check_periodic_pairing(west: BoundaryCondition, east: BoundaryCondition) -> FlexureResult<()> {
    match (west, east) {
        (BoundaryCondition::Periodic, BoundaryCondition::Periodic) => Ok(()),
        (BoundaryCondition::Periodic, _) => Err(FlexureError::OneSidedPeriodic(Side::West.to_string())),
        (_, BoundaryCondition::Periodic) => Err(FlexureError::OneSidedPeriodic(Side::East.to_string())),
        _ => Ok(()),
    }
}

/// Rewrite the West and East edge rows of `bands` for the selected conditions
pub fn apply_boundary_conditions(
    mut bands: CoefficientBands,
    stencil: &StencilCoefficients,
    west: BoundaryCondition,
    east: BoundaryCondition,
    diagnostics: &Diagnostics,
) -> FlexureResult<CoefficientBands> {
    check_periodic_pairing(west, east)?;

    let nx = bands.nx();
    if nx < 4 {
        return Err(FlexureError::InvalidInput(format!(
            "edge rows need at least 4 cells, got {nx}"
        )));
    }

    for (side, bc) in [(Side::West, west), (Side::East, east)] {
        diagnostics.info(format_args!("Boundary condition, {side}: {bc}"));

        let [outer, inner] = side.edge_rows(nx);
        let edge = EdgeContext {
            kind: stencil.kind(),
            outer: side.orient(stencil.cell(outer)),
            inner: side.orient(stencil.cell(inner)),
        };

        if let Some([outer_row, inner_row]) = bc.rule().rewrite(&edge)? {
            bands.set_row(outer, side.place(outer_row));
            bands.set_row(inner, side.place(inner_row));
        }
    }

    diagnostics.debug(format_args!(
        "{} off-grid coefficient slots after boundary conditions",
        bands.off_grid_count()
    ));
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [BoundaryCondition; 6] = [
        BoundaryCondition::Periodic,
        BoundaryCondition::Dirichlet0,
        BoundaryCondition::ZeroMomentZeroShear,
        BoundaryCondition::ZeroSlopeZeroShear,
        BoundaryCondition::Mirror,
        BoundaryCondition::Neumann,
    ];

    fn constant_cell(k: f64, b: f64) -> EdgeCell {
        EdgeCell {
            far_out: k,
            near_out: -4.0 * k,
            center: 6.0 * k + b,
            near_in: -4.0 * k,
            far_in: k,
        }
    }

    fn assert_rows_eq(a: &[EdgeRow; 2], b: &[EdgeRow; 2]) {
        for (ra, rb) in a.iter().zip(b) {
            let pairs = [
                (ra.far_out, rb.far_out),
                (ra.near_out, rb.near_out),
                (ra.center, rb.center),
                (ra.near_in, rb.near_in),
                (ra.far_in, rb.far_in),
            ];
            for (x, y) in pairs {
                match (x, y) {
                    (Some(x), Some(y)) => assert_relative_eq!(x, y, max_relative = 1e-12),
                    (None, None) => {}
                    _ => panic!("off-grid slots differ: {:?} vs {:?}", ra, rb),
                }
            }
        }
    }

    #[test]
    fn test_rule_table_matches_condition() {
        for bc in ALL {
            assert_eq!(bc.rule().condition(), bc);
        }
    }

    #[test]
    fn test_labels_round_trip() {
        for bc in ALL {
            assert_eq!(bc.label().parse::<BoundaryCondition>().unwrap(), bc);
        }
        assert!(matches!(
            "Sandbox".parse::<BoundaryCondition>(),
            Err(FlexureError::UnsupportedBoundaryCondition(_))
        ));
        assert!(matches!(
            "Clamped".parse::<BoundaryCondition>(),
            Err(FlexureError::UnknownBoundaryCondition(_))
        ));
    }

    #[test]
    fn test_closed_forms_match_recombination() {
        let k = 1e10;
        let b = 3300.0 * 9.8;
        let cell = constant_cell(k, b);
        let constant = EdgeContext {
            kind: StencilKind::Constant {
                stiffness: k,
                buoyancy: b,
            },
            outer: cell,
            inner: cell,
        };
        let variable = EdgeContext {
            kind: StencilKind::Variable,
            ..constant
        };

        for bc in [
            BoundaryCondition::ZeroMomentZeroShear,
            BoundaryCondition::ZeroSlopeZeroShear,
            BoundaryCondition::Mirror,
        ] {
            let closed = bc.rule().rewrite(&constant).unwrap().unwrap();
            let recombined = bc.rule().rewrite(&variable).unwrap().unwrap();
            assert_rows_eq(&closed, &recombined);
        }
    }

    #[test]
    fn test_free_edge_rows_conserve_bending() {
        // Without buoyancy a free edge carries no stiffness against rigid translation
        let k = 1.0;
        let edge = EdgeContext {
            kind: StencilKind::Constant {
                stiffness: k,
                buoyancy: 0.0,
            },
            outer: constant_cell(k, 0.0),
            inner: constant_cell(k, 0.0),
        };
        let rows = BoundaryCondition::ZeroMomentZeroShear
            .rule()
            .rewrite(&edge)
            .unwrap()
            .unwrap();
        for row in rows {
            let sum: f64 = [row.far_out, row.near_out, row.center, row.near_in, row.far_in]
                .iter()
                .flatten()
                .sum();
            assert_relative_eq!(sum, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_east_is_mirror_image_of_west() {
        let cell = [1.0, 2.0, 3.0, 4.0, 5.0];
        let east = Side::East.orient(cell);
        assert_eq!(east.far_out, 5.0);
        assert_eq!(east.near_in, 2.0);

        let row = EdgeRow::outermost(10.0, 20.0, 30.0);
        assert_eq!(
            Side::East.place(row),
            [Some(30.0), Some(20.0), Some(10.0), None, None]
        );
        assert_eq!(
            Side::West.place(row),
            [None, None, Some(10.0), Some(20.0), Some(30.0)]
        );
        assert_eq!(Side::East.edge_rows(7), [6, 5]);
    }

    #[test]
    fn test_one_sided_periodic_rejected() {
        assert!(check_periodic_pairing(BoundaryCondition::Periodic, BoundaryCondition::Periodic).is_ok());
        assert!(matches!(
            check_periodic_pairing(BoundaryCondition::Mirror, BoundaryCondition::Periodic),
            Err(FlexureError::OneSidedPeriodic(side)) if side == "East"
        ));
    }

    #[test]
    fn test_neumann_is_reported() {
        let cell = constant_cell(1.0, 0.0);
        let edge = EdgeContext {
            kind: StencilKind::Variable,
            outer: cell,
            inner: cell,
        };
        assert!(matches!(
            BoundaryCondition::Neumann.rule().rewrite(&edge),
            Err(FlexureError::UnsupportedBoundaryCondition(_))
        ));
    }

    #[test]
    fn test_apply_marks_off_grid_slots() {
        use crate::stencil::PlateConstants;

        let stencil = StencilCoefficients::constant(1e22, &PlateConstants::new(1000.0, 3300.0, 9.8), 8);
        let bands = CoefficientBands::from_stencil(&stencil);
        let bands = apply_boundary_conditions(
            bands,
            &stencil,
            BoundaryCondition::ZeroMomentZeroShear,
            BoundaryCondition::Mirror,
            &Diagnostics::quiet(),
        )
        .unwrap();

        assert_eq!(bands.off_grid_count(), 6);
        assert_eq!(bands.l2[0], None);
        assert_eq!(bands.l1[0], None);
        assert_eq!(bands.l2[1], None);
        assert_eq!(bands.r2[7], None);
        assert_eq!(bands.r1[7], None);
        assert_eq!(bands.r2[6], None);
        // Interior rows untouched
        assert_eq!(bands.row(4), CoefficientBands::from_stencil(&stencil).row(4));
    }
}
