//! Transform-family selection from the perspective row of a homography.
//!
//! An image that was only moved, rotated or uniformly scaled on the map has
//! a homography whose bottom row is `(0, 0, 1)`; a first-order polynomial
//! describes it exactly. Dragging a single corner introduces perspective
//! terms, and the annotation then declares a family able to bend.

use std::fmt;

use georef_core::{Mat3, Real};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::homography::perspective_terms;

/// Default threshold on `‖(H[2,0], H[2,1])‖₂`.
pub const PERSPECTIVE_THRESHOLD: Real = 1e-8;
/// Default GCP count below which a projective pose gets an advisory.
pub const PROJECTIVE_MIN_GCPS: usize = 6;

/// Transformation block of a georeferencing annotation.
///
/// ```json
/// { "type": "polynomial", "options": { "order": 1 } }
/// { "type": "thinPlateSpline" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transformation {
    Polynomial { options: PolynomialOptions },
    ThinPlateSpline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialOptions {
    pub order: u8,
}

impl Transformation {
    pub fn polynomial(order: u8) -> Self {
        Self::Polynomial {
            options: PolynomialOptions { order },
        }
    }

    /// Fewest GCPs this family can be fitted with.
    pub fn min_gcps(&self) -> usize {
        match self {
            Self::Polynomial { options } => match options.order {
                0 | 1 => 3,
                2 => 6,
                _ => 10,
            },
            Self::ThinPlateSpline => 3,
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polynomial { options } => write!(f, "polynomial (order {})", options.order),
            Self::ThinPlateSpline => write!(f, "thin-plate spline"),
        }
    }
}

/// Family declared for projective poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectiveFamily {
    #[default]
    ThinPlateSpline,
    Polynomial2,
}

impl ProjectiveFamily {
    pub fn transformation(self) -> Transformation {
        match self {
            Self::ThinPlateSpline => Transformation::ThinPlateSpline,
            Self::Polynomial2 => Transformation::polynomial(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub perspective_threshold: Real,
    pub projective_min_gcps: usize,
    pub projective_family: ProjectiveFamily,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            perspective_threshold: PERSPECTIVE_THRESHOLD,
            projective_min_gcps: PROJECTIVE_MIN_GCPS,
            projective_family: ProjectiveFamily::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformClass {
    Affine,
    Projective,
}

/// Non-fatal finding attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    /// The pose is projective and fewer GCPs than recommended were given.
    FewGcpsForProjective { gcps: usize, recommended: usize },
    /// The declared family needs more GCPs than were given.
    FamilyMinimumUnmet {
        transformation: Transformation,
        gcps: usize,
        required: usize,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FewGcpsForProjective { gcps, recommended } => write!(
                f,
                "corners were moved independently (projective); {gcps} GCPs given, \
                 at least {recommended} recommended"
            ),
            Self::FamilyMinimumUnmet {
                transformation,
                gcps,
                required,
            } => write!(
                f,
                "{transformation} needs at least {required} GCPs, got {gcps}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub class: TransformClass,
    /// `‖(H[2,0], H[2,1])‖₂`.
    pub perspective_norm: Real,
    pub transformation: Transformation,
    pub advisories: Vec<Advisory>,
}

impl Classification {
    pub fn is_projective(&self) -> bool {
        self.class == TransformClass::Projective
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransformClassifier {
    pub config: ClassifierConfig,
}

impl TransformClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Decide the class of `h` and the family to declare for `gcp_count`
    /// control points. Advisories are logged at `warn` and returned.
    pub fn classify(&self, h: &Mat3, gcp_count: usize) -> Classification {
        let (p31, p32) = perspective_terms(h);
        let perspective_norm = p31.hypot(p32);

        let class = if perspective_norm > self.config.perspective_threshold {
            TransformClass::Projective
        } else {
            TransformClass::Affine
        };
        let transformation = match class {
            TransformClass::Affine => Transformation::polynomial(1),
            TransformClass::Projective => self.config.projective_family.transformation(),
        };

        let mut advisories = Vec::new();
        if class == TransformClass::Projective && gcp_count < self.config.projective_min_gcps {
            advisories.push(Advisory::FewGcpsForProjective {
                gcps: gcp_count,
                recommended: self.config.projective_min_gcps,
            });
        }
        let required = transformation.min_gcps();
        if gcp_count < required {
            advisories.push(Advisory::FamilyMinimumUnmet {
                transformation,
                gcps: gcp_count,
                required,
            });
        }
        for a in &advisories {
            warn!("{a}");
        }

        Classification {
            class,
            perspective_norm,
            transformation,
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformation_json_shape() {
        let poly = serde_json::to_value(Transformation::polynomial(1)).unwrap();
        assert_eq!(
            poly,
            serde_json::json!({ "type": "polynomial", "options": { "order": 1 } })
        );
        let tps = serde_json::to_value(Transformation::ThinPlateSpline).unwrap();
        assert_eq!(tps, serde_json::json!({ "type": "thinPlateSpline" }));

        let parsed: Transformation =
            serde_json::from_str(r#"{"type":"polynomial","options":{"order":2}}"#).unwrap();
        assert_eq!(parsed, Transformation::polynomial(2));
    }

    #[test]
    fn family_minimums() {
        assert_eq!(Transformation::polynomial(1).min_gcps(), 3);
        assert_eq!(Transformation::polynomial(2).min_gcps(), 6);
        assert_eq!(Transformation::polynomial(3).min_gcps(), 10);
        assert_eq!(Transformation::ThinPlateSpline.min_gcps(), 3);
    }

    #[test]
    fn affine_matrix_is_order_one() {
        let h = Mat3::new(2.0, 0.5, 10.0, -0.5, 2.0, 3.0, 0.0, 0.0, 1.0);
        let c = TransformClassifier::default().classify(&h, 4);
        assert_eq!(c.class, TransformClass::Affine);
        assert_eq!(c.transformation, Transformation::polynomial(1));
        assert!(c.advisories.is_empty());
    }

    #[test]
    fn projective_with_few_gcps_advises() {
        let h = Mat3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1e-4, 0.0, 1.0);
        let c = TransformClassifier::default().classify(&h, 4);
        assert!(c.is_projective());
        assert_eq!(c.transformation, Transformation::ThinPlateSpline);
        assert_eq!(
            c.advisories,
            vec![Advisory::FewGcpsForProjective {
                gcps: 4,
                recommended: 6
            }]
        );

        let enough = TransformClassifier::default().classify(&h, 6);
        assert!(enough.advisories.is_empty());
    }

    #[test]
    fn polynomial_family_minimum_is_checked() {
        let cfg = ClassifierConfig {
            projective_family: ProjectiveFamily::Polynomial2,
            ..ClassifierConfig::default()
        };
        let h = Mat3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 3e-6, 1.0);
        let c = TransformClassifier::new(cfg).classify(&h, 5);
        assert_eq!(c.transformation, Transformation::polynomial(2));
        assert_eq!(c.advisories.len(), 2);
        assert!(matches!(
            c.advisories[1],
            Advisory::FamilyMinimumUnmet { required: 6, gcps: 5, .. }
        ));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: ClassifierConfig =
            serde_json::from_str(r#"{"projectiveFamily":"polynomial2"}"#).unwrap();
        assert_eq!(cfg.projective_family, ProjectiveFamily::Polynomial2);
        assert_eq!(cfg.projective_min_gcps, 6);
        assert_eq!(cfg.perspective_threshold, PERSPECTIVE_THRESHOLD);
    }
}
