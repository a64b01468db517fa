//! Axis triple construction

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{Axis, FrameError, FrameResult};
use crate::config::BuildConfig;
use crate::constants::{DEFAULT_TOLERANCE, PARALLEL_THRESHOLD};

/// Orthonormal (d, w, h) frame of a part
///
/// When an axis is derived it always follows the cyclic order
/// `h = d × w`, `w = h × d`, `d = w × h`, so derived triples are right-handed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTriple {
    d: Vec3,
    w: Vec3,
    h: Vec3,
}

impl Default for AxisTriple {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl AxisTriple {
    /// d = X, w = Y, h = Z
    pub const CANONICAL: Self = Self {
        d: Vec3::X,
        w: Vec3::Y,
        h: Vec3::Z,
    };

    /// Start building a triple with validation on
    pub fn builder() -> AxisTripleBuilder {
        AxisTripleBuilder::default()
    }

    /// Build from optional axes; `None` means "unspecified"
    pub fn from_options(
        d: Option<Vec3>,
        w: Option<Vec3>,
        h: Option<Vec3>,
        validate: bool,
        tolerance: f32,
    ) -> FrameResult<Self> {
        AxisTripleBuilder {
            d,
            w,
            h,
            validate,
            tolerance,
        }
        .build()
    }

    /// Unit vector of one axis
    pub fn axis(&self, axis: Axis) -> Vec3 {
        match axis {
            Axis::D => self.d,
            Axis::W => self.w,
            Axis::H => self.h,
        }
    }

    pub fn d(&self) -> Vec3 {
        self.d
    }

    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn h(&self) -> Vec3 {
        self.h
    }

    /// `scalar * unit(axis)`
    pub fn scale(&self, axis: Axis, scalar: f32) -> Vec3 {
        self.axis(axis) * scalar
    }

    /// Matrix whose columns are d, w and h
    pub fn basis(&self) -> Mat3 {
        Mat3::from_cols(self.d, self.w, self.h)
    }

    /// Rotation taking X, Y, Z onto d, w, h (right-handed triples only)
    pub fn rotation(&self) -> Option<Quat> {
        self.is_right_handed()
            .then(|| Quat::from_mat3(&self.basis()).normalize())
    }

    pub fn is_right_handed(&self) -> bool {
        self.d.cross(self.w).dot(self.h) > 0.0
    }
}

/// Builder for [`AxisTriple`]
#[derive(Debug, Clone, Copy)]
pub struct AxisTripleBuilder {
    d: Option<Vec3>,
    w: Option<Vec3>,
    h: Option<Vec3>,
    validate: bool,
    tolerance: f32,
}

impl Default for AxisTripleBuilder {
    fn default() -> Self {
        Self {
            d: None,
            w: None,
            h: None,
            validate: true,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

fn canonical(axis: Axis) -> Vec3 {
    AxisTriple::CANONICAL.axis(axis)
}

impl AxisTripleBuilder {
    /// Builder taking validation and tolerance from a build configuration
    pub fn configured(config: &BuildConfig) -> Self {
        Self {
            validate: config.validate_axes,
            tolerance: config.tolerance,
            ..Self::default()
        }
    }

    pub fn d(mut self, v: Vec3) -> Self {
        self.d = Some(v);
        self
    }

    pub fn w(mut self, v: Vec3) -> Self {
        self.w = Some(v);
        self
    }

    pub fn h(mut self, v: Vec3) -> Self {
        self.h = Some(v);
        self
    }

    /// Set one axis by role
    pub fn set(self, axis: Axis, v: Vec3) -> Self {
        match axis {
            Axis::D => self.d(v),
            Axis::W => self.w(v),
            Axis::H => self.h(v),
        }
    }

    /// Check perpendicularity and handedness of the given axes
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn given(&self, axis: Axis) -> Option<Vec3> {
        match axis {
            Axis::D => self.d,
            Axis::W => self.w,
            Axis::H => self.h,
        }
    }

    /// Complete the triple
    pub fn build(self) -> FrameResult<AxisTriple> {
        let mut axes: [Option<Vec3>; 3] = [None; 3];
        for (slot, axis) in axes.iter_mut().zip(Axis::ALL) {
            if let Some(v) = self.given(axis) {
                let unit = v.try_normalize().ok_or_else(|| {
                    FrameError::InvalidAxisSpecification(format!(
                        "axis_{} {:?} cannot be normalized",
                        axis, v
                    ))
                })?;
                *slot = Some(unit);
            }
        }

        for (i, j) in [(0, 1), (1, 2), (0, 2)] {
            if let (Some(a), Some(b)) = (axes[i], axes[j]) {
                let cos = a.dot(b).abs();
                if cos > self.tolerance {
                    let msg = format!(
                        "axis_{} and axis_{} are not perpendicular (|cos| = {})",
                        Axis::ALL[i],
                        Axis::ALL[j],
                        cos
                    );
                    if self.validate {
                        return Err(FrameError::InvalidAxisSpecification(msg));
                    }
                    tracing::warn!("{}", msg);
                }
            }
        }

        let count = axes.iter().filter(|a| a.is_some()).count();
        match count {
            0 => {
                return Err(FrameError::InvalidAxisSpecification(
                    "no axis given".into(),
                ));
            }
            1 => {
                let role = Axis::ALL
                    .into_iter()
                    .find(|a| axes[*a as usize].is_some())
                    .ok_or_else(|| FrameError::InvalidAxisSpecification("no axis given".into()))?;
                let given = axes[role as usize].unwrap_or(canonical(role));
                let next = role.next();
                axes[next as usize] = Some(perpendicular(given, role, next)?);
                let last = next.next();
                axes[last as usize] = Some(derive(&axes, last)?);
            }
            2 => {
                let missing = Axis::ALL
                    .into_iter()
                    .find(|a| axes[*a as usize].is_none())
                    .ok_or_else(|| FrameError::InvalidAxisSpecification("no axis missing".into()))?;
                axes[missing as usize] = Some(derive(&axes, missing)?);
            }
            _ => {}
        }

        let triple = match axes {
            [Some(d), Some(w), Some(h)] => AxisTriple { d, w, h },
            _ => {
                return Err(FrameError::InvalidAxisSpecification(
                    "incomplete axis triple".into(),
                ));
            }
        };

        if count == 3 && self.validate && !triple.is_right_handed() {
            return Err(FrameError::InvalidAxisSpecification(format!(
                "left-handed triple d={:?} w={:?} h={:?}",
                triple.d, triple.w, triple.h
            )));
        }
        Ok(triple)
    }
}

/// Cross product of the two other axes in cyclic order
fn derive(axes: &[Option<Vec3>; 3], missing: Axis) -> FrameResult<Vec3> {
    let a = missing.next();
    let b = a.next();
    match (axes[a as usize], axes[b as usize]) {
        (Some(va), Some(vb)) => va.cross(vb).try_normalize().ok_or_else(|| {
            FrameError::InvalidAxisSpecification(format!(
                "axis_{} and axis_{} are parallel",
                a, b
            ))
        }),
        _ => Err(FrameError::InvalidAxisSpecification(format!(
            "cannot derive axis_{}",
            missing
        ))),
    }
}

/// Unit vector for `role` perpendicular to `given`, starting from its canonical direction
fn perpendicular(given: Vec3, given_role: Axis, role: Axis) -> FrameResult<Vec3> {
    let mut seed = canonical(role);
    if seed.dot(given).abs() > PARALLEL_THRESHOLD {
        seed = canonical(given_role);
    }
    (seed - given * seed.dot(given))
        .try_normalize()
        .ok_or_else(|| {
            FrameError::InvalidAxisSpecification(format!(
                "no perpendicular for axis_{} {:?}",
                given_role, given
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn test_two_axes_derive_third_canonically() {
        let t = AxisTriple::builder().d(Vec3::X).w(Vec3::Y).build().unwrap();
        assert!(close(t.h(), Vec3::Z));

        let t = AxisTriple::builder().h(Vec3::Z).d(Vec3::X).build().unwrap();
        assert!(close(t.w(), Vec3::Y));

        let t = AxisTriple::builder().w(Vec3::Y).h(Vec3::Z).build().unwrap();
        assert!(close(t.d(), Vec3::X));
    }

    #[test]
    fn test_derived_axis_is_unit_and_perpendicular() {
        let d = Vec3::new(1.0, 1.0, 0.0).normalize();
        let h = Vec3::Z;
        let t = AxisTriple::builder().d(d).h(h).build().unwrap();
        assert_relative_eq!(t.w().length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(t.w().dot(d), 0.0, epsilon = 1e-6);
        assert_relative_eq!(t.w().dot(h), 0.0, epsilon = 1e-6);
        assert!(t.is_right_handed());
    }

    #[test]
    fn test_single_axis_defaults() {
        let t = AxisTriple::builder().h(Vec3::Z).build().unwrap();
        assert_eq!(t, AxisTriple::CANONICAL);

        let t = AxisTriple::builder().w(Vec3::Y).build().unwrap();
        assert!(close(t.d(), Vec3::X));
        assert!(close(t.h(), Vec3::Z));

        // d along Y: the canonical w (Y) is parallel, so X seeds w instead
        let t = AxisTriple::builder().d(Vec3::Y).build().unwrap();
        assert!(close(t.w(), Vec3::X));
        assert!(close(t.h(), Vec3::NEG_Z));
    }

    #[test]
    fn test_same_input_same_handedness() {
        let build = || {
            AxisTriple::builder()
                .d(Vec3::new(0.3, -0.2, 0.9))
                .build()
                .unwrap()
        };
        let a = build();
        for _ in 0..10 {
            assert_eq!(build(), a);
        }
        assert!(a.is_right_handed());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            AxisTriple::builder().build(),
            Err(FrameError::InvalidAxisSpecification(_))
        ));
        // explicit zero is not the same as unspecified
        assert!(AxisTriple::builder().d(Vec3::ZERO).build().is_err());
        assert!(
            AxisTriple::builder()
                .d(Vec3::X)
                .w(Vec3::new(1.0, 1.0, 0.0))
                .build()
                .is_err()
        );
        // parallel pair cannot produce a third axis even without validation
        assert!(
            AxisTriple::builder()
                .d(Vec3::X)
                .w(Vec3::NEG_X)
                .validate(false)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_left_handed_triple_rejected_when_validating() {
        let left = AxisTriple::builder().d(Vec3::X).w(Vec3::Y).h(Vec3::NEG_Z);
        assert!(left.build().is_err());
        let unchecked = left.validate(false).build().unwrap();
        assert!(!unchecked.is_right_handed());
        assert!(unchecked.rotation().is_none());
    }

    #[test]
    fn test_rotation_maps_canonical_axes() {
        let t = AxisTriple::builder().d(Vec3::Y).w(Vec3::NEG_X).build().unwrap();
        let q = t.rotation().unwrap();
        assert!(close(q * Vec3::X, t.d()));
        assert!(close(q * Vec3::Y, t.w()));
        assert!(close(q * Vec3::Z, t.h()));
    }

    #[test]
    fn test_scale() {
        let t = AxisTriple::CANONICAL;
        assert_eq!(t.scale(Axis::W, -3.0), Vec3::new(0.0, -3.0, 0.0));
    }
}
