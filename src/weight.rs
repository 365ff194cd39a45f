//! Grid point weight generator
//!
//! Reduces `Mgg` to a 6×6 rigid-body mass matrix about a reference point
//! and derives the principal mass axes, centre of gravity and inertia
//! (Nastran GPWG table).

use log::{debug, warn};
use nalgebra::{DVector, Matrix3, Matrix6, Vector3};
use serde::Serialize;

use crate::analysis::WeightReference;
use crate::dof::DofIndex;
use crate::elements::Positions;
use crate::error::{FEAError, FEAResult};
use crate::math::{symmetric_eigen_sorted, Mat, SystemMatrix};

/// Off-diagonal to diagonal ratio of `Mt` above which the mass axes are
/// considered coupled
const COUPLING_RATIO: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPointWeight {
    pub reference: WeightReference,
    /// Rigid-body mass matrix about the reference point
    pub mo: Matrix6<f64>,
    /// Principal mass axes (columns)
    pub s: Matrix3<f64>,
    /// Mass along each principal axis
    pub mass: Vector3<f64>,
    /// Centre of gravity; row `i` is the CG seen by the mass in direction `i`
    pub cg: Matrix3<f64>,
    /// Inertia about the CG in the principal mass frame
    pub inertia_s: Matrix3<f64>,
    /// Principal inertias
    pub inertia_q: Vector3<f64>,
    /// Principal inertia axes (columns)
    pub q: Matrix3<f64>,
}

impl GridPointWeight {
    /// Mass of the model (first principal mass)
    pub fn total_mass(&self) -> f64 {
        self.mass[0]
    }
}

/// Rigid-body transformation `D` (N × 6): grid rows `[[I, Tr], [0, I]]`,
/// scalar point rows zero
fn rigid_body_modes(
    index: &DofIndex,
    positions: &Positions,
    reference: &Vector3<f64>,
) -> FEAResult<Mat> {
    let mut d = Mat::zeros(index.len(), 6);
    for grid in index.grids() {
        let p = positions
            .get(&grid.id)
            .ok_or(FEAError::UnresolvedDof {
                id: grid.id,
                component: 1,
            })?;
        let r = p - reference;
        let tr = Matrix3::new(0.0, r[2], -r[1], -r[2], 0.0, r[0], r[1], -r[0], 0.0);

        let b = grid.base;
        for i in 0..3 {
            d[(b + i, i)] = 1.0;
            d[(b + 3 + i, 3 + i)] = 1.0;
            for j in 0..3 {
                d[(b + i, 3 + j)] = tr[(i, j)];
            }
        }
    }
    Ok(d)
}

/// `Sᵀ X S`
fn triple(s: &Matrix3<f64>, x: &Matrix3<f64>) -> Matrix3<f64> {
    s.transpose() * x * s
}

fn finite_or_zero(m: Matrix3<f64>) -> Matrix3<f64> {
    m.map(|v| if v.is_finite() { v } else { 0.0 })
}

fn to_matrix3(m: &Mat) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| m[(i, j)])
}

/// Compute the grid point weight of `mgg` about `reference`
pub fn grid_point_weight(
    index: &DofIndex,
    positions: &Positions,
    mgg: &SystemMatrix,
    reference: WeightReference,
) -> FEAResult<GridPointWeight> {
    let origin = match reference {
        WeightReference::Origin => Vector3::zeros(),
        WeightReference::Grid(id) => *positions.get(&id).ok_or_else(|| {
            FEAError::Configuration(format!(
                "grid point weight reference grid {} does not exist",
                id
            ))
        })?,
    };

    let d = rigid_body_modes(index, positions, &origin)?;
    let mut md = Mat::zeros(index.len(), 6);
    for c in 0..6 {
        let col: DVector<f64> = d.column(c).into_owned();
        md.set_column(c, &mgg.mul_vector(&col));
    }
    let mo_dyn = d.tr_mul(&md);
    let mo = Matrix6::from_fn(|i, j| mo_dyn[(i, j)]);

    let mt_bar: Matrix3<f64> = mo.fixed_view::<3, 3>(0, 0).into_owned();
    let mtr_bar: Matrix3<f64> = mo.fixed_view::<3, 3>(0, 3).into_owned();
    let mr_bar: Matrix3<f64> = mo.fixed_view::<3, 3>(3, 3).into_owned();

    let delta = mt_bar.diagonal().norm();
    let epsilon = Vector3::new(mt_bar[(0, 1)], mt_bar[(0, 2)], mt_bar[(1, 2)]).norm();
    if delta > 0.0 && epsilon / delta > COUPLING_RATIO {
        warn!(
            "mass axes are coupled: off-diagonal/diagonal ratio {:.4e} exceeds {}",
            epsilon / delta,
            COUPLING_RATIO
        );
    }

    let mt_dyn = Mat::from_fn(3, 3, |i, j| mt_bar[(i, j)]);
    let (_, s_dyn) = symmetric_eigen_sorted(mt_dyn);
    let s = to_matrix3(&s_dyn);

    let mt = triple(&s, &mt_bar);
    let mtr = triple(&s, &mtr_bar);
    let mr = triple(&s, &mr_bar);

    let mass = mt.diagonal();
    let (mx, my, mz) = (mass[0], mass[1], mass[2]);

    let mut cg = Matrix3::new(
        mtr[(0, 0)],
        -mtr[(0, 2)],
        mtr[(0, 1)],
        mtr[(1, 2)],
        mtr[(1, 1)],
        -mtr[(1, 0)],
        -mtr[(2, 1)],
        mtr[(2, 0)],
        mtr[(2, 2)],
    );
    for (row, m) in mass.iter().enumerate() {
        if *m != 0.0 {
            cg.row_mut(row).unscale_mut(*m);
        }
    }

    let (yx, zx) = (cg[(0, 1)], cg[(0, 2)]);
    let (xy, zy) = (cg[(1, 0)], cg[(1, 2)]);
    let (xz, yz) = (cg[(2, 0)], cg[(2, 1)]);

    let i11 = mr[(0, 0)] - my * zy * zy - mz * yz * yz;
    let i12 = -mr[(0, 1)] - mz * xz * yz;
    let i13 = -mr[(0, 2)] - my * xy * zy;
    let i22 = mr[(1, 1)] - mz * xz * xz - mx * zx * zx;
    let i23 = -mr[(1, 2)] - mx * yx * zx;
    let i33 = mr[(2, 2)] - mx * yx * yx - my * xy * xy;
    let inertia_s = finite_or_zero(Matrix3::new(
        i11, i12, i13, i12, i22, i23, i13, i23, i33,
    ));

    // principal inertias of the off-diagonal-reversed tensor
    let mut reversed = inertia_s;
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                reversed[(i, j)] = -reversed[(i, j)];
            }
        }
    }
    let (iq, q_dyn) = symmetric_eigen_sorted(Mat::from_fn(3, 3, |i, j| reversed[(i, j)]));
    let q = to_matrix3(&q_dyn);

    debug!(
        "grid point weight about {:?}: mass = [{:.6e}, {:.6e}, {:.6e}]",
        reference, mx, my, mz
    );
    Ok(GridPointWeight {
        reference,
        mo,
        s,
        mass,
        cg,
        inertia_s,
        inertia_q: Vector3::new(iq[0], iq[1], iq[2]),
        q,
    })
}
