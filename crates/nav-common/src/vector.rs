//! Vector utilities

use glam::Vec3;

/// Renders a vector as an entity key-value string.
///
/// Each component is truncated toward zero, so `(12.9, -3.7, 40.0)` renders
/// as `"12 -3 40"`.
pub fn keyvalue(v: &Vec3) -> String {
    format!("{} {} {}", v.x as i32, v.y as i32, v.z as i32)
}

/// Length of a vector
#[inline]
pub fn magnitude(v: &Vec3) -> f32 {
    v.length()
}

/// Calculates the distance between two points
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (*b - *a).length()
}

/// Midpoint of two points
#[inline]
pub fn midpoint(a: &Vec3, b: &Vec3) -> Vec3 {
    (*a + *b) / 2.0
}

/// Returns `v` raised (or lowered, for negative `dz`) along the Z axis
#[inline]
pub fn raised(v: &Vec3, dz: f32) -> Vec3 {
    Vec3::new(v.x, v.y, v.z + dz)
}
