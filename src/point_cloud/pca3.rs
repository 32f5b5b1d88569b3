//! Principal-axis analysis of 3D point clouds.

use glam::{Mat3A, Vec3, Vec3A};
use glam_matrix_extras::{SymmetricEigen3, SymmetricMat3};
use obvhs::aabb::Aabb;
use thiserror::Error;

/// Principal-axis analysis of a set of 3D points.
///
/// The result contains the eigenvectors and eigenvalues of the covariance matrix,
/// as well as the centroid of the input points. Eigenvectors are stored in a
/// canonical form: sorted by descending eigenvalue, with each eigenvector's sign
/// chosen so that its largest-magnitude component is positive. The underlying
/// eigensolver makes no ordering or sign guarantee, so downstream code must never
/// depend on the raw solver output; the canonical form is what this type promises.
///
/// The analysis can then be used to transform the points so that their centroid is
/// at the origin and their principal axes are aligned with the X, Y, and Z axes.
/// The transformation is applied with [`Pca3::apply_transform`] and reverted with
/// [`Pca3::revert_transform`]. Note the asymmetry: alignment multiplies by the
/// *transpose* of the eigenvector matrix, while mapping aligned quantities back to
/// the original frame multiplies by the matrix itself. Bounding boxes measured in
/// the aligned frame are recovered in original coordinates through the revert path.
///
/// # Example
///
/// ```
/// use approx::assert_relative_eq;
/// use finalign::point_cloud::Pca3;
/// use glam::Vec3A;
///
/// let points = vec![
///     Vec3A::new(1.0, 0.0, 0.0),
///     Vec3A::new(0.0, 1.0, 0.0),
///     Vec3A::new(0.0, 0.0, 1.0),
///     Vec3A::new(-1.0, -1.0, -1.0),
/// ];
///
/// let pca = Pca3::from_points(&points).unwrap();
///
/// // Align the points with the principal axes.
/// let mut aligned = points.clone();
/// pca.apply_transform(&mut aligned);
///
/// // The centroid of the aligned points is at the origin.
/// let centroid = aligned.iter().sum::<Vec3A>() / aligned.len() as f32;
/// assert!(centroid.length() < 1e-6);
///
/// // Revert the transformation.
/// pca.revert_transform(&mut aligned);
///
/// for (original, reverted) in points.iter().zip(aligned.iter()) {
///     assert_relative_eq!(original, reverted, epsilon = 1e-6);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Pca3 {
    /// The eigenvectors of the covariance matrix, one per column, in canonical order.
    eigenvectors: Mat3A,
    /// The eigenvalues of the covariance matrix, sorted in descending order.
    eigenvalues: Vec3A,
    /// The centroid computed from the input points.
    centroid: Vec3A,
}

/// Errors that can occur during [`Pca3`] computation.
#[derive(Error, Debug)]
pub enum Pca3Error {
    /// The input slice is empty.
    #[error("the input point cloud is empty")]
    NoPoints,
    /// The number of significant eigenvalues is less than 3, so the principal
    /// axes are not well defined.
    #[error("degenerate point cloud: only {rank} of 3 significant eigenvalues")]
    InsufficientRank {
        /// The number of significant eigenvalues.
        rank: usize,
        /// The analysis that was computed from the degenerate input. The
        /// eigenvectors spanning the deficient directions are arbitrary but
        /// still orthonormal, so the transform does not crash; it just carries
        /// no information along those axes.
        pca: Pca3,
    },
}

impl Pca3 {
    /// Computes the principal axes of a set of 3D points.
    ///
    /// Returns `None` if the input slice is empty. The analysis is always
    /// computed, even if the points are degenerate (for example, all points
    /// coincident or collinear). For a version that reports degenerate input
    /// as an error, see [`Pca3::try_from_points`].
    pub fn from_points(points: &[Vec3A]) -> Option<Pca3> {
        if points.is_empty() {
            return None;
        }

        // Compute the centroid.
        let centroid = points.iter().sum::<Vec3A>() / points.len() as f32;

        // Compute the covariance matrix of the centered points.
        let mut cov = SymmetricMat3::ZERO;
        for point in points {
            cov += SymmetricMat3::from_outer_product(Vec3::from(*point - centroid));
        }
        cov /= points.len() as f32;

        // The eigenvectors of the covariance matrix are the principal axes.
        let eigen = SymmetricEigen3::new(cov);
        let (eigenvectors, eigenvalues) =
            canonicalize(Mat3A::from(eigen.eigenvectors), Vec3A::from(eigen.eigenvalues));

        Some(Pca3 {
            eigenvectors,
            eigenvalues,
            centroid,
        })
    }

    /// Computes the principal axes of a set of 3D points, reporting degenerate
    /// input as an error.
    ///
    /// The given epsilon determines which eigenvalues count as significant.
    ///
    /// # Errors
    ///
    /// - [`Pca3Error::NoPoints`]: the input slice is empty.
    /// - [`Pca3Error::InsufficientRank`]: fewer than 3 significant eigenvalues.
    ///   The `pca` field carries the degenerate analysis for callers that want
    ///   the documented degenerate-but-usable result.
    #[inline]
    pub fn try_from_points(points: &[Vec3A], epsilon: f32) -> Result<Pca3, Pca3Error> {
        let pca = Pca3::from_points(points).ok_or(Pca3Error::NoPoints)?;

        let rank = pca
            .eigenvalues
            .to_array()
            .iter()
            .filter(|v| v.abs() > epsilon)
            .count();

        if rank < 3 {
            return Err(Pca3Error::InsufficientRank { rank, pca });
        }

        Ok(pca)
    }

    /// Creates an analysis from precomputed eigenvectors, eigenvalues, and centroid.
    ///
    /// No validation or canonicalization is performed on the input values.
    /// In most cases, use [`Pca3::from_points`] instead.
    #[inline]
    pub fn from_raw(eigenvectors: Mat3A, eigenvalues: Vec3A, centroid: Vec3A) -> Pca3 {
        Pca3 {
            eigenvectors,
            eigenvalues,
            centroid,
        }
    }

    /// Returns the eigenvectors (principal axes) as the columns of a matrix,
    /// sorted by descending eigenvalue.
    #[inline]
    pub fn eigenvectors(&self) -> Mat3A {
        self.eigenvectors
    }

    /// Returns the eigenvalues (variances along the principal axes) in
    /// descending order.
    #[inline]
    pub fn eigenvalues(&self) -> Vec3A {
        self.eigenvalues
    }

    /// Returns the centroid (arithmetic mean) computed from the input points.
    #[inline]
    pub fn centroid(&self) -> Vec3A {
        self.centroid
    }

    /// Aligns a set of points with the principal axes, modifying them in place.
    ///
    /// The points are translated so that the centroid is at the origin, then
    /// rotated by the transpose of the eigenvector matrix so that the principal
    /// axes coincide with the X, Y, and Z axes.
    ///
    /// Returns the axis-aligned bounding box of the transformed points.
    #[inline]
    pub fn apply_transform(&self, points: &mut [Vec3A]) -> Aabb {
        let mut aabb = Aabb::INVALID;
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
    /// This is the exact inverse of [`Pca3::apply_transform`]: points are
    /// rotated by the eigenvector matrix itself, then translated by the centroid.
    ///
    /// Returns the axis-aligned bounding box of the reverted points.
    #[inline]
    pub fn revert_transform(&self, points: &mut [Vec3A]) -> Aabb {
        let mut aabb = Aabb::INVALID;
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
fn canonicalize(eigenvectors: Mat3A, eigenvalues: Vec3A) -> (Mat3A, Vec3A) {
    let mut pairs = [
        (eigenvalues.x, eigenvectors.col(0)),
        (eigenvalues.y, eigenvectors.col(1)),
        (eigenvalues.z, eigenvectors.col(2)),
    ];
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let columns = pairs.map(|(_, v)| {
        let abs = v.abs();
        let dominant = if abs.x >= abs.y && abs.x >= abs.z {
            v.x
        } else if abs.y >= abs.z {
            v.y
        } else {
            v.z
        };
        if dominant < 0.0 { -v } else { v }
    });

    (
        Mat3A::from_cols(columns[0], columns[1], columns[2]),
        Vec3A::new(pairs[0].0, pairs[1].0, pairs[2].0),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn example_points() -> Vec<Vec3A> {
        vec![
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
            Vec3A::new(0.0, 0.0, 1.0),
            Vec3A::new(-1.0, -1.0, -1.0),
        ]
    }

    #[test]
    fn align_and_revert() {
        let points = example_points();
        let pca = Pca3::from_points(&points).unwrap();

        let mut transformed = points.clone();
        let transformed_aabb = pca.apply_transform(&mut transformed);
        let transformed_expected_aabb = Aabb::from_points(&transformed);

        // The centroid is at the origin after transformation.
        let centroid = transformed.iter().sum::<Vec3A>() / transformed.len() as f32;
        assert!(centroid.length() < 1e-6);

        // The points are aligned with the principal axes, so the covariance
        // matrix of the transformed points is diagonal.
        let cov = {
            let mut cov = SymmetricMat3::ZERO;
            for point in &transformed {
                cov += SymmetricMat3::from_outer_product(Vec3::from(*point - centroid));
            }
            cov / transformed.len() as f32
        };
        let off_diag_sum = cov.m01.abs() + cov.m02.abs() + cov.m12.abs();
        assert!(off_diag_sum < 1e-6);

        // Reverting recovers the original points.
        let reverted_aabb = pca.revert_transform(&mut transformed);
        for (original, reverted) in points.iter().zip(transformed.iter()) {
            assert_relative_eq!(original, reverted, epsilon = 1e-6);
        }

        assert_relative_eq!(
            transformed_aabb.min,
            transformed_expected_aabb.min,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            transformed_aabb.max,
            transformed_expected_aabb.max,
            epsilon = 1e-6
        );

        let reverted_expected_aabb = Aabb::from_points(&points);
        assert_relative_eq!(reverted_aabb.min, reverted_expected_aabb.min, epsilon = 1e-6);
        assert_relative_eq!(reverted_aabb.max, reverted_expected_aabb.max, epsilon = 1e-6);
    }

    #[test]
    fn eigenvalues_sorted_descending() {
        // A cloud stretched most along Z, then X, then Y.
        let points = vec![
            Vec3A::new(0.0, 0.0, 10.0),
            Vec3A::new(0.0, 0.0, -10.0),
            Vec3A::new(3.0, 0.0, 0.0),
            Vec3A::new(-3.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
            Vec3A::new(0.0, -1.0, 0.0),
        ];
        let pca = Pca3::from_points(&points).unwrap();
        let eig = pca.eigenvalues();

        assert!(eig.x >= eig.y && eig.y >= eig.z);
        // The dominant axis is Z, sign-fixed positive.
        let primary = pca.eigenvectors().col(0);
        assert!(primary.z > 0.9);
    }

    #[test]
    fn empty_input() {
        let points: Vec<Vec3A> = Vec::new();
        assert!(Pca3::from_points(&points).is_none());
        assert!(matches!(
            Pca3::try_from_points(&points, 1e-6),
            Err(Pca3Error::NoPoints)
        ));
    }

    #[test]
    fn coincident_points_are_rank_zero() {
        let points = vec![Vec3A::splat(1.0), Vec3A::splat(1.0)];
        let pca = Pca3::try_from_points(&points, 1e-6);
        assert!(matches!(
            pca,
            Err(Pca3Error::InsufficientRank { rank: 0, .. })
        ));
    }

    #[test]
    fn collinear_points_are_rank_one() {
        let points = vec![
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(2.0, 0.0, 0.0),
            Vec3A::new(3.0, 0.0, 0.0),
        ];
        let pca = Pca3::try_from_points(&points, 1e-6);
        assert!(matches!(
            pca,
            Err(Pca3Error::InsufficientRank { rank: 1, .. })
        ));
    }

    #[test]
    fn coplanar_points_are_rank_two() {
        let points = vec![
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
            Vec3A::new(-1.0, 0.0, 0.0),
            Vec3A::new(0.0, -1.0, 0.0),
        ];
        let pca = Pca3::try_from_points(&points, 1e-6);
        assert!(matches!(
            pca,
            Err(Pca3Error::InsufficientRank { rank: 2, .. })
        ));
    }

    #[test]
    fn degenerate_transform_does_not_crash() {
        let points = vec![Vec3A::splat(2.0), Vec3A::splat(2.0)];
        let Err(Pca3Error::InsufficientRank { pca, .. }) = Pca3::try_from_points(&points, 1e-6)
        else {
            panic!("expected degenerate input to be reported");
        };

        let mut aligned = points.clone();
        pca.apply_transform(&mut aligned);
        for point in &aligned {
            assert!(point.length() < 1e-6);
        }
    }
}
