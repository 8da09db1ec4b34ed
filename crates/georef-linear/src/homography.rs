//! Homography estimation (plane-to-plane projective transform).
//!
//! The homography `H` maps **source** points (image pixels) to
//! **destination** points (map-layer pixels): `x' ~ H x`, with `H[2,2]`
//! fixed to 1 so eight parameters remain.
//!
//! Each correspondence `(X, Y) → (x, y)` contributes two rows
//!
//! ```text
//! [X, Y, 1, 0, 0, 0, -xX, -xY] · h = x
//! [0, 0, 0, X, Y, 1, -yX, -yY] · h = y
//! ```
//!
//! and the stacked system is solved through its normal equations
//! `AᵗA h = Aᵗb`. For exactly four points this equals the direct solution;
//! more points give the least-squares fit through the same code path.
//! Points are Hartley-normalized before assembly and the result is
//! de-normalized.

use georef_core::linalg::{gaussian_elimination, guard_nonzero, invert3, normal_equations};
use georef_core::{LinalgError, Mat3, Pt2, Real, SolveDiagnostics, apply_homography};
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::normalize_points_2d;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("source and destination differ in length ({src} vs {dst})")]
    LengthMismatch { src: usize, dst: usize },
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Estimated homography plus the conditioning of the solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomographyEstimate {
    /// `H` with `H[2,2] == 1`.
    pub h: Mat3,
    pub diagnostics: SolveDiagnostics,
}

impl HomographyEstimate {
    pub fn apply(&self, p: &Pt2) -> Pt2 {
        apply_homography(&self.h, p)
    }

    /// Perspective row entries `(H[2,0], H[2,1])`.
    pub fn perspective_terms(&self) -> (Real, Real) {
        perspective_terms(&self.h)
    }
}

/// Perspective row entries `(H[2,0], H[2,1])` of a homography.
pub fn perspective_terms(h: &Mat3) -> (Real, Real) {
    (h[(2, 0)], h[(2, 1)])
}

/// High-level entry point for homography estimation.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

/// Estimate `H` such that `dst ~ H src` in the least-squares sense.
pub fn estimate_homography(src: &[Pt2], dst: &[Pt2]) -> Result<HomographyEstimate, HomographyError> {
    HomographySolver::least_squares(src, dst)
}

impl HomographySolver {
    /// Estimate `H` from `n >= 4` correspondences via the normal equations.
    ///
    /// Numerical degeneracy (collinear or coincident points) is not an
    /// error: the elimination substitutes near-zero pivots and the
    /// returned [`SolveDiagnostics`] records it.
    ///
    /// # Errors
    ///
    /// Fewer than four correspondences, or lists of different length.
    pub fn least_squares(
        src: &[Pt2],
        dst: &[Pt2],
    ) -> Result<HomographyEstimate, HomographyError> {
        let n = src.len();
        if dst.len() != n {
            return Err(HomographyError::LengthMismatch {
                src: n,
                dst: dst.len(),
            });
        }
        if n < 4 {
            return Err(HomographyError::NotEnoughPoints(n));
        }

        let (src_n, t_src, dst_n, t_dst) =
            match (normalize_points_2d(src), normalize_points_2d(dst)) {
                (Some((s, ts)), Some((d, td))) => (s, ts, d, td),
                _ => {
                    debug!("degenerate point set; estimating homography without normalization");
                    (src.to_vec(), Mat3::identity(), dst.to_vec(), Mat3::identity())
                }
            };

        let (a, b) = design_system(&src_n, &dst_n);
        let (ata, atb) = normal_equations(&a, &b)?;
        let sol = gaussian_elimination(&ata, &atb)?;
        if sol.diagnostics.is_degenerate() {
            debug!(
                "homography normal equations near-singular (min pivot {:e})",
                sol.diagnostics.min_abs_pivot
            );
        }

        let x = &sol.x;
        let h_norm = Mat3::new(x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0);
        let h = invert3(&t_dst) * h_norm * t_src;
        let h = h / guard_nonzero(h[(2, 2)]);

        Ok(HomographyEstimate {
            h,
            diagnostics: sol.diagnostics,
        })
    }
}

/// Stack the two projective equations of every correspondence.
fn design_system(src: &[Pt2], dst: &[Pt2]) -> (DMatrix<Real>, DVector<Real>) {
    let n = src.len();
    let mut a = DMatrix::<Real>::zeros(2 * n, 8);
    let mut b = DVector::<Real>::zeros(2 * n);

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let (sx, sy) = (s.x, s.y);
        let (dx, dy) = (d.x, d.y);
        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = sx;
        a[(r0, 1)] = sy;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -dx * sx;
        a[(r0, 7)] = -dx * sy;
        b[r0] = dx;

        a[(r1, 3)] = sx;
        a[(r1, 4)] = sy;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -dy * sx;
        a[(r1, 7)] = -dy * sy;
        b[r1] = dy;
    }

    (a, b)
}
