//! Principal-axis analysis of 2D point clouds.

use glam::{Mat2, Vec2};
use glam_matrix_extras::{SymmetricEigen2, SymmetricMat2};
use thiserror::Error;

use crate::obb::Aabb2;

/// Principal-axis analysis of a set of 2D points.
///
/// The planar counterpart of [`Pca3`](crate::point_cloud::Pca3), used for profile
/// curves and the 2D alignment walkthrough. Eigenvectors are stored in canonical
/// form: sorted by descending eigenvalue, each sign-fixed so its largest-magnitude
/// component is positive.
///
/// Alignment multiplies centered points by the transpose of the eigenvector
/// matrix; [`Pca2::revert_transform`] multiplies by the matrix itself. Quantities
/// measured in the aligned frame (bounding-box corners in particular) are mapped
/// back to the original frame through the revert path.
///
/// # Example
///
/// ```
/// use finalign::point_cloud::Pca2;
/// use glam::Vec2;
///
/// let points = vec![
///     Vec2::new(0.0, 0.0),
///     Vec2::new(2.0, 2.0),
///     Vec2::new(3.0, 3.5),
///     Vec2::new(5.0, 4.5),
/// ];
///
/// let pca = Pca2::from_points(&points).unwrap();
/// let mut aligned = points.clone();
/// let aabb = pca.apply_transform(&mut aligned);
///
/// // The cloud stretches mostly along its first principal axis.
/// let extents = aabb.half_extents();
/// assert!(extents.x > extents.y);
/// ```
#[derive(Clone, Debug)]
pub struct Pca2 {
    /// The eigenvectors of the covariance matrix, one per column, in canonical order.
    eigenvectors: Mat2,
    /// The eigenvalues of the covariance matrix, sorted in descending order.
    eigenvalues: Vec2,
    /// The centroid computed from the input points.
    centroid: Vec2,
}

/// Errors that can occur during [`Pca2`] computation.
#[derive(Error, Debug)]
pub enum Pca2Error {
    /// The input slice is empty.
    #[error("the input point cloud is empty")]
    NoPoints,
    /// The number of significant eigenvalues is less than 2, so the principal
    /// axes are not well defined.
    #[error("degenerate point cloud: only {rank} of 2 significant eigenvalues")]
    InsufficientRank {
        /// The number of significant eigenvalues.
        rank: usize,
        /// The analysis that was computed from the degenerate input.
        pca: Pca2,
    },
}

impl Pca2 {
    /// Computes the principal axes of a set of 2D points.
    ///
    /// Returns `None` if the input slice is empty. The analysis is always
    /// computed, even for degenerate input; see [`Pca2::try_from_points`] for
    /// the checked version.
    pub fn from_points(points: &[Vec2]) -> Option<Pca2> {
        if points.is_empty() {
            return None;
        }

        // Compute the centroid.
        let centroid = points.iter().sum::<Vec2>() / points.len() as f32;

        // Compute the covariance matrix of the centered points.
        let mut cov = SymmetricMat2::ZERO;
        for point in points {
            cov += SymmetricMat2::from_outer_product(*point - centroid);
        }
        cov /= points.len() as f32;

        // The eigenvectors of the covariance matrix are the principal axes.
        let eigen = SymmetricEigen2::new(cov);
        let (eigenvectors, eigenvalues) = canonicalize(eigen.eigenvectors, eigen.eigenvalues);

        Some(Pca2 {
            eigenvectors,
            eigenvalues,
            centroid,
        })
    }

    /// Computes the principal axes of a set of 2D points, reporting degenerate
    /// input as an error.
    ///
    /// # Errors
    ///
    /// - [`Pca2Error::NoPoints`]: the input slice is empty.
    /// - [`Pca2Error::InsufficientRank`]: fewer than 2 significant eigenvalues,
    ///   carrying the degenerate analysis in its `pca` field.
    #[inline]
    pub fn try_from_points(points: &[Vec2], epsilon: f32) -> Result<Pca2, Pca2Error> {
        let pca = Pca2::from_points(points).ok_or(Pca2Error::NoPoints)?;

        let rank = pca
            .eigenvalues
            .to_array()
            .iter()
            .filter(|v| v.abs() > epsilon)
            .count();

        if rank < 2 {
            return Err(Pca2Error::InsufficientRank { rank, pca });
        }

        Ok(pca)
    }

    /// Creates an analysis from precomputed eigenvectors, eigenvalues, and centroid.
    ///
    /// No validation or canonicalization is performed on the input values.
    #[inline]
    pub fn from_raw(eigenvectors: Mat2, eigenvalues: Vec2, centroid: Vec2) -> Pca2 {
        Pca2 {
            eigenvectors,
            eigenvalues,
            centroid,
        }
    }

    /// Returns the eigenvectors (principal axes) as the columns of a matrix,
    /// sorted by descending eigenvalue.
    #[inline]
    pub fn eigenvectors(&self) -> Mat2 {
        self.eigenvectors
    }

    /// Returns the eigenvalues (variances along the principal axes) in
    /// descending order.
    #[inline]
    pub fn eigenvalues(&self) -> Vec2 {
        self.eigenvalues
    }

    /// Returns the centroid (arithmetic mean) computed from the input points.
    #[inline]
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Aligns a set of points with the principal axes, modifying them in place.
    ///
    /// The points are translated so that the centroid is at the origin, then
    /// rotated by the transpose of the eigenvector matrix.
    ///
    /// Returns the axis-aligned bounding box of the transformed points.
    #[inline]
    pub fn apply_transform(&self, points: &mut [Vec2]) -> Aabb2 {
        let mut aabb = Aabb2::INVALID;
        let rotation = self.eigenvectors.transpose();

        for point in &mut *points {
            let new_point = rotation * (*point - self.centroid);
            *point = new_point;
            aabb.extend(new_point);
        }

        aabb
    }

    /// Maps a set of aligned points back to the original frame, modifying them
    /// in place.
    ///
    /// Returns the axis-aligned bounding box of the reverted points.
    #[inline]
    pub fn revert_transform(&self, points: &mut [Vec2]) -> Aabb2 {
        let mut aabb = Aabb2::INVALID;
        let inv_rotation = self.eigenvectors;

        for point in &mut *points {
            let new_point = inv_rotation * (*point) + self.centroid;
            *point = new_point;
            aabb.extend(new_point);
        }

        aabb
    }
}

/// Sorts the eigenvector columns by descending eigenvalue and flips each
/// eigenvector's sign so that its largest-magnitude component is positive.
fn canonicalize(eigenvectors: Mat2, eigenvalues: Vec2) -> (Mat2, Vec2) {
    let mut pairs = [
        (eigenvalues.x, eigenvectors.col(0)),
        (eigenvalues.y, eigenvectors.col(1)),
    ];
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let columns = pairs.map(|(_, v)| {
        let dominant = if v.x.abs() >= v.y.abs() { v.x } else { v.y };
        if dominant < 0.0 { -v } else { v }
    });

    (
        Mat2::from_cols(columns[0], columns[1]),
        Vec2::new(pairs[0].0, pairs[1].0),
    )
}
