//! Dense linear algebra kernel.
//!
//! Solvers here favour availability over exactness: a numerically-zero pivot
//! or determinant is replaced by [`PIVOT_EPSILON`] instead of being reported
//! as a singular matrix. The result may then be badly conditioned but is
//! always finite. Every elimination reports a [`SolveDiagnostics`] so callers
//! can surface the degradation as an advisory.
//!
//! Transposes and products come straight from nalgebra's `DMatrix`/`DVector`
//! operators; this module adds the pieces nalgebra does not provide in the
//! guarded form the estimators rely on.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Mat3, Real};

/// Magnitude below which a pivot or determinant counts as zero.
pub const PIVOT_EPSILON: Real = 1e-12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinalgError {
    #[error("system matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("right-hand side has {rhs} entries but the system has {rows} rows")]
    RhsMismatch { rows: usize, rhs: usize },
}

/// Conditioning report for one elimination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Smallest absolute pivot encountered (before substitution).
    pub min_abs_pivot: Real,
    /// Number of pivots replaced by [`PIVOT_EPSILON`].
    pub substituted_pivots: usize,
}

impl SolveDiagnostics {
    /// `true` when at least one pivot had to be substituted.
    pub fn is_degenerate(&self) -> bool {
        self.substituted_pivots > 0
    }
}

/// Solution vector plus its conditioning report.
#[derive(Debug, Clone)]
pub struct Solution {
    pub x: DVector<Real>,
    pub diagnostics: SolveDiagnostics,
}

/// Replace a near-zero value by `±PIVOT_EPSILON`, keeping its sign.
pub fn guard_nonzero(v: Real) -> Real {
    if v.abs() < PIVOT_EPSILON {
        if v.is_sign_negative() {
            -PIVOT_EPSILON
        } else {
            PIVOT_EPSILON
        }
    } else {
        v
    }
}

/// Assemble the normal equations `(AᵗA, Aᵗb)` of an over- or exactly
/// determined system `A x = b`.
pub fn normal_equations(
    a: &DMatrix<Real>,
    b: &DVector<Real>,
) -> Result<(DMatrix<Real>, DVector<Real>), LinalgError> {
    if a.nrows() != b.len() {
        return Err(LinalgError::RhsMismatch {
            rows: a.nrows(),
            rhs: b.len(),
        });
    }
    let at = a.transpose();
    Ok((&at * a, &at * b))
}

/// Solve the square system `A x = b` by Gauss–Jordan elimination with
/// partial pivoting.
///
/// At each column the remaining row with the largest absolute entry is
/// swapped into place. A pivot below [`PIVOT_EPSILON`] is substituted rather
/// than rejected; see the module docs.
///
/// # Errors
///
/// Only shape errors: a non-square `A` or a right-hand side of the wrong
/// length.
pub fn gaussian_elimination(
    a: &DMatrix<Real>,
    b: &DVector<Real>,
) -> Result<Solution, LinalgError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LinalgError::NotSquare {
            rows: n,
            cols: a.ncols(),
        });
    }
    if b.len() != n {
        return Err(LinalgError::RhsMismatch { rows: n, rhs: b.len() });
    }

    // Augmented matrix [A | b].
    let mut m = DMatrix::<Real>::zeros(n, n + 1);
    m.view_mut((0, 0), (n, n)).copy_from(a);
    m.set_column(n, b);

    let mut min_abs_pivot = Real::INFINITY;
    let mut substituted_pivots = 0;

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if m[(row, col)].abs() > m[(pivot, col)].abs() {
                pivot = row;
            }
        }
        if pivot != col {
            m.swap_rows(col, pivot);
        }

        let raw = m[(col, col)];
        min_abs_pivot = min_abs_pivot.min(raw.abs());
        let div = guard_nonzero(raw);
        if div != raw {
            substituted_pivots += 1;
            debug!("pivot in column {col} is {raw:e}; substituting {div:e}");
        }

        for j in col..=n {
            m[(col, j)] /= div;
        }
        for i in 0..n {
            if i == col {
                continue;
            }
            let f = m[(i, col)];
            if f == 0.0 {
                continue;
            }
            for j in col..=n {
                let v = m[(col, j)];
                m[(i, j)] -= f * v;
            }
        }
    }

    if n == 0 {
        min_abs_pivot = 0.0;
    }

    Ok(Solution {
        x: m.column(n).into_owned(),
        diagnostics: SolveDiagnostics {
            min_abs_pivot,
            substituted_pivots,
        },
    })
}

/// Determinant of a 3×3 matrix, guarded away from zero.
pub fn guarded_determinant3(m: &Mat3) -> Real {
    guard_nonzero(m.determinant())
}

/// Closed-form inverse of a 3×3 matrix via the adjugate.
///
/// The determinant is guarded with [`guard_nonzero`], so a singular input
/// yields a very large but finite matrix instead of `NaN`/`inf`.
pub fn invert3(m: &Mat3) -> Mat3 {
    let (a, b, c) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (d, e, f) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (g, h, i) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);

    // Cofactors.
    let ca = e * i - f * h;
    let cb = -(d * i - f * g);
    let cc = d * h - e * g;
    let cd = -(b * i - c * h);
    let ce = a * i - c * g;
    let cf = -(a * h - b * g);
    let cg = b * f - c * e;
    let ch = -(a * f - c * d);
    let ci = a * e - b * d;

    let det = guard_nonzero(a * ca + b * cb + c * cc);
    Mat3::new(
        ca / det,
        cd / det,
        cg / det,
        cb / det,
        ce / det,
        ch / det,
        cc / det,
        cf / det,
        ci / det,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_system() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, -1.0]);
        let b = DVector::from_row_slice(&[5.0, 1.0]);
        let sol = gaussian_elimination(&a, &b).unwrap();
        assert!((sol.x[0] - 2.0).abs() < 1e-12);
        assert!((sol.x[1] - 1.0).abs() < 1e-12);
        assert!(!sol.diagnostics.is_degenerate());
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // Leading zero would break naive elimination.
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let x_true = DVector::from_row_slice(&[1.0, -2.0, 0.5]);
        let b = &a * &x_true;
        let sol = gaussian_elimination(&a, &b).unwrap();
        assert!((sol.x - x_true).norm() < 1e-12);
    }

    #[test]
    fn singular_system_substitutes_pivot() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[3.0, 6.0]);
        let sol = gaussian_elimination(&a, &b).unwrap();
        assert_eq!(sol.diagnostics.substituted_pivots, 1);
        assert!(sol.diagnostics.min_abs_pivot < PIVOT_EPSILON);
        assert!(sol.x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn shape_errors() {
        let a = DMatrix::<Real>::zeros(2, 3);
        let b = DVector::<Real>::zeros(2);
        assert_eq!(
            gaussian_elimination(&a, &b).unwrap_err(),
            LinalgError::NotSquare { rows: 2, cols: 3 }
        );

        let a = DMatrix::<Real>::identity(2, 2);
        let b = DVector::<Real>::zeros(3);
        assert!(matches!(
            gaussian_elimination(&a, &b),
            Err(LinalgError::RhsMismatch { rows: 2, rhs: 3 })
        ));
        assert!(normal_equations(&a, &b).is_err());
    }

    #[test]
    fn normal_equations_of_overdetermined_line_fit() {
        // Fit y = m x + c through (0,1), (1,3), (2,5).
        let a = DMatrix::from_row_slice(3, 2, &[0.0, 1.0, 1.0, 1.0, 2.0, 1.0]);
        let b = DVector::from_row_slice(&[1.0, 3.0, 5.0]);
        let (ata, atb) = normal_equations(&a, &b).unwrap();
        assert_eq!(ata.shape(), (2, 2));
        let sol = gaussian_elimination(&ata, &atb).unwrap();
        assert!((sol.x[0] - 2.0).abs() < 1e-12);
        assert!((sol.x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invert3_matches_nalgebra() {
        let m = Mat3::new(2.0, 0.5, 1.0, -1.0, 3.0, 0.0, 0.25, 0.1, 1.0);
        let inv = invert3(&m);
        let reference = m.try_inverse().unwrap();
        assert!((inv - reference).norm() < 1e-12);
        assert!((m * inv - Mat3::identity()).norm() < 1e-12);
    }

    #[test]
    fn invert3_undoes_rotation_with_translation() {
        let (sin, cos) = 30f64.to_radians().sin_cos();
        let m = Mat3::new(cos, -sin, 120.0, sin, cos, -45.0, 0.0, 0.0, 1.0);
        let inv = invert3(&m);
        assert!((m * inv - Mat3::identity()).norm() < 1e-12);
        assert!((inv * m - Mat3::identity()).norm() < 1e-12);
    }

    #[test]
    fn invert3_singular_is_finite() {
        let m = Mat3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0);
        let inv = invert3(&m);
        assert!(inv.iter().all(|v| v.is_finite()));
        assert_eq!(guarded_determinant3(&m), PIVOT_EPSILON);
    }
}
