//! Axis-aligned bounding boxes for camera framing

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::math::{self, Vec3};

/// 3D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY, f32::INFINITY, f32::INFINITY],
            max: [f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    /// Bounding box of a set of spheres
    pub fn from_spheres<I>(spheres: I) -> Self
    where
        I: IntoIterator<Item = (Vec3, f32)>,
    {
        let mut bb = Self::empty();
        for (center, radius) in spheres {
            bb.include_sphere(center, radius);
        }
        bb
    }

    /// Check if bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1] || self.min[2] > self.max[2]
    }

    /// Include a point in the bounding box
    pub fn include_point(&mut self, p: Vec3) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    /// Include a sphere in the bounding box
    pub fn include_sphere(&mut self, center: Vec3, radius: f32) {
        let r = radius.max(0.0);
        self.include_point(math::sub(center, [r, r, r]));
        self.include_point(math::add(center, [r, r, r]));
    }

    /// Center of the bounding box (origin when empty)
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return math::ZERO;
        }
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Size of the bounding box (zero when empty)
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return math::ZERO;
        }
        math::sub(self.max, self.min)
    }

    /// Largest absolute coordinate on any axis (zero when empty)
    pub fn max_abs_extent(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.min
            .iter()
            .chain(self.max.iter())
            .fold(0.0_f32, |acc, c| acc.max(c.abs()))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (min, max) = if self.is_empty() {
            (math::ZERO, math::ZERO)
        } else {
            (self.min, self.max)
        };
        let mut state = serializer.serialize_struct("BoundingBox", 3)?;
        state.serialize_field("min", &min)?;
        state.serialize_field("max", &max)?;
        state.serialize_field("center", &self.center())?;
        state.end()
    }
}
