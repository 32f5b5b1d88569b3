//! Axis-aligned and oriented bounding boxes for aligned point clouds.
//!
//! [`Obb2`] and [`Obb3`] measure a cloud that has already been rotated into its
//! principal-axis frame (see [`Pca2`](crate::point_cloud::Pca2) and
//! [`Pca3`](crate::point_cloud::Pca3)). The box itself is a pure axis-aligned
//! measurement; it becomes an *oriented* bounding box when the caller maps its
//! center and corners back to the original frame with the forward rotation,
//! i.e. `revert_transform`.

use glam::{Vec2, Vec3A};
use obvhs::aabb::Aabb;
use thiserror::Error;

/// Errors that can occur while computing a bounding box.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ObbError {
    /// The input point cloud has no points.
    #[error("cannot compute a bounding box of an empty point cloud")]
    Empty,
}

/// A 2D axis-aligned bounding box defined by its minimum and maximum corners.
///
/// The planar counterpart of [`obvhs::aabb::Aabb`], which remains the 3D box
/// type throughout the crate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb2 {
    /// The minimum corner of the box.
    pub min: Vec2,
    /// The maximum corner of the box.
    pub max: Vec2,
}

impl Aabb2 {
    /// An invalid box with `min` at positive infinity and `max` at negative
    /// infinity, so that extending it with any point yields that point.
    pub const INVALID: Aabb2 = Aabb2 {
        min: Vec2::INFINITY,
        max: Vec2::NEG_INFINITY,
    };

    /// Creates a box from its minimum and maximum corners.
    #[inline]
    pub fn new(min: Vec2, max: Vec2) -> Aabb2 {
        Aabb2 { min, max }
    }

    /// Computes the bounding box of a set of points.
    #[inline]
    pub fn from_points(points: &[Vec2]) -> Aabb2 {
        let mut aabb = Aabb2::INVALID;
        for point in points {
            aabb.extend(*point);
        }
        aabb
    }

    /// Grows the box to contain the given point.
    #[inline]
    pub fn extend(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns the center of the box, `min + half_extents`.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.half_extents()
    }

    /// Returns the half-extents of the box, `(max - min) / 2`.
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// An oriented bounding box of a 2D point cloud, measured in the cloud's
/// principal-axis frame.
///
/// # Example
///
/// ```
/// use finalign::{obb::Obb2, point_cloud::Pca2};
/// use glam::Vec2;
///
/// let points = vec![
///     Vec2::new(0.0, 0.0),
///     Vec2::new(4.0, 4.0),
///     Vec2::new(3.0, 4.5),
///     Vec2::new(1.0, -0.5),
/// ];
///
/// let pca = Pca2::from_points(&points).unwrap();
/// let mut aligned = points.clone();
/// pca.apply_transform(&mut aligned);
///
/// let obb = Obb2::from_aligned_points(&aligned).unwrap();
///
/// // Map the closed corner loop back to the original frame for plotting.
/// let mut corners = obb.corners();
/// pca.revert_transform(&mut corners);
/// assert_eq!(corners[0], corners[4]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb2 {
    /// The box center in the aligned frame.
    pub center: Vec2,
    /// Half the box size along each principal axis.
    pub half_extents: Vec2,
}

impl Obb2 {
    /// Measures the bounding box of a point cloud that has already been rotated
    /// into its principal-axis frame.
    ///
    /// # Errors
    ///
    /// Returns [`ObbError::Empty`] if the cloud has no points.
    pub fn from_aligned_points(aligned: &[Vec2]) -> Result<Obb2, ObbError> {
        if aligned.is_empty() {
            return Err(ObbError::Empty);
        }

        let aabb = Aabb2::from_points(aligned);
        Ok(Obb2 {
            center: aabb.center(),
            half_extents: aabb.half_extents(),
        })
    }

    /// Returns the rectangle corners as a closed 5-point polygon in the aligned
    /// frame: (−,−), (+,−), (+,+), (−,+), then the first corner repeated so the
    /// loop closes for plotting.
    ///
    /// Use [`Pca2::revert_transform`](crate::point_cloud::Pca2::revert_transform)
    /// to map the loop back to the original frame.
    #[inline]
    pub fn corners(&self) -> [Vec2; 5] {
        let (c, h) = (self.center, self.half_extents);
        [
            c + Vec2::new(-h.x, -h.y),
            c + Vec2::new(h.x, -h.y),
            c + Vec2::new(h.x, h.y),
            c + Vec2::new(-h.x, h.y),
            c + Vec2::new(-h.x, -h.y),
        ]
    }
}

/// An oriented bounding box of a 3D point cloud, measured in the cloud's
/// principal-axis frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb3 {
    /// The box center in the aligned frame.
    pub center: Vec3A,
    /// Half the box size along each principal axis.
    pub half_extents: Vec3A,
}

impl Obb3 {
    /// Measures the bounding box of a point cloud that has already been rotated
    /// into its principal-axis frame.
    ///
    /// # Errors
    ///
    /// Returns [`ObbError::Empty`] if the cloud has no points.
    pub fn from_aligned_points(aligned: &[Vec3A]) -> Result<Obb3, ObbError> {
        if aligned.is_empty() {
            return Err(ObbError::Empty);
        }

        let aabb = Aabb::from_points(aligned);
        Ok(Obb3 {
            center: (aabb.min + aabb.max) * 0.5,
            half_extents: (aabb.max - aabb.min) * 0.5,
        })
    }
}
