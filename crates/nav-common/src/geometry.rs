//! Axis-aligned geometry on the XY plane (Z-up)
//!
//! Navigation areas are rectangles in X/Y with per-corner elevations, so most
//! of the tests here ignore Z. Node hulls use the full 3D overlap test.

use glam::Vec3;

/// Largest coordinate magnitude a navigation area may use. Extents past it
/// are treated as corrupt.
pub const WORLD_COORD_LIMIT: f32 = 131_072.0;

/// Extents of an area in world coordinates.
///
/// `lo.z` is the elevation at `(lo.x, lo.y)` and `hi.z` the elevation at
/// `(hi.x, hi.y)`; they are not necessarily the minimum and maximum Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Extent {
    pub lo: Vec3,
    pub hi: Vec3,
}

impl Extent {
    /// Creates a new extent from its two corners
    pub fn new(lo: Vec3, hi: Vec3) -> Self {
        Self { lo, hi }
    }

    /// `hi - lo`
    #[inline]
    pub fn delta(&self) -> Vec3 {
        self.hi - self.lo
    }

    /// 2D area of the extent (`delta.x * delta.y`)
    #[inline]
    pub fn size(&self) -> f32 {
        let d = self.delta();
        d.x * d.y
    }

    /// Centroid of the extent
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.lo + self.hi) / 2.0
    }

    /// True if the extent has no width or no depth (or is inverted)
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.lo.x >= self.hi.x || self.lo.y >= self.hi.y
    }

    /// True if every corner coordinate is finite and within
    /// [`WORLD_COORD_LIMIT`]
    pub fn is_bounded(&self) -> bool {
        let limit = Vec3::splat(WORLD_COORD_LIMIT);
        self.lo.is_finite()
            && self.hi.is_finite()
            && self.lo.abs().cmple(limit).all()
            && self.hi.abs().cmple(limit).all()
    }

    /// Inclusive 2D containment test
    #[inline]
    pub fn contains_2d(&self, pos: &Vec3) -> bool {
        pos.x >= self.lo.x && pos.x <= self.hi.x && pos.y >= self.lo.y && pos.y <= self.hi.y
    }

    /// Clamps the X/Y of `pos` into the extent, keeping its Z
    pub fn clamp_2d(&self, pos: &Vec3) -> Vec3 {
        Vec3::new(
            pos.x.max(self.lo.x).min(self.hi.x),
            pos.y.max(self.lo.y).min(self.hi.y),
            pos.z,
        )
    }
}

/// Check if two axis-aligned bounding boxes overlap.
///
/// Touching faces count as overlap.
#[inline]
pub fn overlap_bounds(amin: &Vec3, amax: &Vec3, bmin: &Vec3, bmax: &Vec3) -> bool {
    amin.x <= bmax.x
        && amax.x >= bmin.x
        && amin.y <= bmax.y
        && amax.y >= bmin.y
        && amin.z <= bmax.z
        && amax.z >= bmin.z
}

/// Inclusive point-in-box test
#[inline]
pub fn point_in_bounds(p: &Vec3, bmin: &Vec3, bmax: &Vec3) -> bool {
    p.x >= bmin.x && p.x <= bmax.x && p.y >= bmin.y && p.y <= bmax.y && p.z >= bmin.z && p.z <= bmax.z
}
