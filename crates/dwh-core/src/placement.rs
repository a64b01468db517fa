//! Part placement
//!
//! A placement maps a point `p` of the part to `rotation * p + translation`:
//! the rotation always acts about the part's own pre-translation position and
//! the translation is applied last. Changing the rotation never moves the
//! translation, so a placement is always built by resetting to the origin,
//! setting the rotation, then assigning the translation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use dwh_kernel::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Placement {
    /// World origin, no rotation
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Reset-then-translate in one step
    pub fn place_at(rotation: Quat, translation: Vec3) -> Self {
        let mut placement = Self::IDENTITY;
        placement.rotation = rotation;
        placement.translation = translation;
        placement
    }

    /// Back to the world origin with identity rotation
    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Assign the translation, keeping the rotation
    pub fn translated(self, translation: Vec3) -> Self {
        Self {
            rotation: self.rotation,
            translation,
        }
    }

    /// Compose a further rotation about the pre-translation position
    ///
    /// The translation is left untouched: rotating it as well would swing the
    /// part around the world origin.
    pub fn rotated(self, rotation: Quat) -> Self {
        Self {
            rotation: (rotation * self.rotation).normalize(),
            translation: self.translation,
        }
    }

    /// Map a point of the part into the parent's coordinates
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Map a direction (no translation)
    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Axis-aligned bounds of a placed box
    pub fn apply_bounds(&self, bounds: Aabb) -> Aabb {
        let corners = bounds.corners().map(|c| self.apply(c));
        Aabb::from_points(&corners).unwrap_or(bounds)
    }

    /// `outer ∘ self`: this placement seen through an enclosing one
    pub fn within(&self, outer: &Placement) -> Placement {
        Placement {
            rotation: (outer.rotation * self.rotation).normalize(),
            translation: outer.apply(self.translation),
        }
    }
}
