//! Center-point definitions for point clouds.
//!
//! Two distinct notions of "center" are in use: the arithmetic mean of the
//! coordinates, and the center of the cloud's axis-aligned bounding box. The
//! mesh pipeline centers on the coordinate mean (after center-of-mass
//! translation), while the 2D profile walkthrough centers on the bounding box.
//! They coincide only for symmetric clouds, so both are exposed under explicit
//! names and callers must pick deliberately.

use glam::{Vec2, Vec3A};
use obvhs::aabb::Aabb;

use crate::obb::Aabb2;

/// Returns the arithmetic mean of a set of 2D points, or `None` if empty.
#[inline]
pub fn centroid_mean2(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().sum::<Vec2>() / points.len() as f32)
}

/// Returns the arithmetic mean of a set of 3D points, or `None` if empty.
#[inline]
pub fn centroid_mean3(points: &[Vec3A]) -> Option<Vec3A> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().sum::<Vec3A>() / points.len() as f32)
}

/// Returns the center of the axis-aligned bounding box of a set of 2D points,
/// or `None` if empty.
#[inline]
pub fn bounding_box_center2(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    Some(Aabb2::from_points(points).center())
}

/// Returns the center of the axis-aligned bounding box of a set of 3D points,
/// or `None` if empty.
#[inline]
pub fn bounding_box_center3(points: &[Vec3A]) -> Option<Vec3A> {
    if points.is_empty() {
        return None;
    }
    let aabb = Aabb::from_points(points);
    Some((aabb.min + aabb.max) * 0.5)
}
