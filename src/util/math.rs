//! Math type re-exports and glTF-specific math utilities.
//!
//! glTF stores matrices as 16 floats in column-major order, which is
//! exactly glam's layout, so conversions are plain copies.

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Column-major 4x4 matrix as stored in JSON.
pub type Mat4Array = [f32; 16];

/// Identity matrix in column-major array form.
pub const IDENTITY_ARRAY: Mat4Array = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Build a matrix from its column-major array form.
#[inline]
pub fn mat4_from_array(m: &Mat4Array) -> Mat4 {
    Mat4::from_cols_array(m)
}

/// Column-major array form of a matrix.
#[inline]
pub fn mat4_to_array(m: &Mat4) -> Mat4Array {
    m.to_cols_array()
}

/// Element-wise comparison within `eps`.
pub fn mat4_approx_eq(a: &Mat4, b: &Mat4, eps: f32) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() <= eps)
}

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounding box of a point set.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Box enclosing this one after an affine transform.
    pub fn transformed(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.expand_by_point(m.transform_point3(corner));
        }
        out
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::EMPTY;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ZERO);

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
        assert_eq!(b.size(), Vec3::ONE);
    }

    #[test]
    fn test_bbox_transformed() {
        let b = BBox3f::new(Vec3::ZERO, Vec3::ONE);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let t = b.transformed(&m);
        assert_eq!(t.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.max, Vec3::new(3.0, 4.0, 5.0));
        assert!(BBox3f::EMPTY.transformed(&m).is_empty());
    }

    #[test]
    fn test_matrix_array_layout() {
        // Translation lives in elements 12..15 of the column-major array
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let a = mat4_to_array(&m);
        assert_eq!(&a[12..15], &[4.0, 5.0, 6.0]);
        assert_eq!(mat4_from_array(&a), m);
        assert_eq!(mat4_from_array(&IDENTITY_ARRAY), Mat4::IDENTITY);
    }
}
