//! Triangle-soup mesh with flattening and principal-axis alignment.

use glam::Vec3A;
use obvhs::aabb::Aabb;
use thiserror::Error;
use tracing::debug;

use crate::point_cloud::{Pca3, Pca3Error};

/// A 3D triangle mesh stored as a flat list of triangles, three vertices each.
///
/// This is the shape STL data arrives in: no shared vertices, no index buffer,
/// just `T × 3 × 3` coordinates. Scan geometry keeps this representation through
/// the whole pipeline so that alignment can hand the vertex array back in an
/// identical shape.
///
/// All transformations are pure and return a new mesh; callers replace their
/// stored mesh instead of observing hidden mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriMesh {
    /// The triangles of the mesh.
    pub triangles: Vec<[Vec3A; 3]>,
}

/// Errors that can occur while reshaping mesh data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A flattened point cloud cannot be reshaped into the requested number of
    /// triangles.
    #[error("cannot reshape a cloud of {got} points into {expected} triangle vertices")]
    ShapeMismatch {
        /// The number of points the requested triangle count demands.
        expected: usize,
        /// The number of points actually supplied.
        got: usize,
    },
}

impl TriMesh {
    /// Creates a mesh from a list of triangles.
    #[inline]
    pub fn new(triangles: Vec<[Vec3A; 3]>) -> TriMesh {
        TriMesh { triangles }
    }

    /// Returns the number of triangles in the mesh.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Flattens the mesh into a point cloud in triangle-major, vertex-minor
    /// order: vertices 0, 1, 2 of triangle 0, then triangle 1, and so on.
    ///
    /// Point `i` of the output corresponds to triangle `i / 3`, vertex `i % 3`,
    /// which makes [`TriMesh::from_flattened`] an exact structural inverse.
    #[inline]
    pub fn flatten(&self) -> Vec<Vec3A> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Rebuilds a mesh from a flattened point cloud and the original triangle
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ShapeMismatch`] if the cloud does not contain
    /// exactly `3 × triangle_count` points.
    pub fn from_flattened(points: &[Vec3A], triangle_count: usize) -> Result<TriMesh, MeshError> {
        if points.len() != triangle_count * 3 {
            return Err(MeshError::ShapeMismatch {
                expected: triangle_count * 3,
                got: points.len(),
            });
        }

        let triangles = points
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect();
        Ok(TriMesh { triangles })
    }

    /// Computes the axis-aligned bounding box of the mesh vertices.
    #[inline]
    pub fn compute_aabb(&self) -> Aabb {
        let mut aabb = Aabb::INVALID;
        for triangle in &self.triangles {
            for vertex in triangle {
                aabb.extend(*vertex);
            }
        }
        aabb
    }

    /// Computes the signed volume enclosed by the mesh using the divergence
    /// theorem, summing tetrahedra with one apex at the origin.
    ///
    /// Positive for counter-clockwise winding, negative for clockwise. Only
    /// meaningful for closed surfaces.
    #[inline]
    pub fn signed_volume(&self) -> f32 {
        self.triangles
            .iter()
            .fold(0.0, |acc, [v0, v1, v2]| {
                acc + tetrahedron_signed_volume(*v0, *v1, *v2)
            })
    }

    /// Computes the volumetric center of mass of the mesh.
    ///
    /// Each origin-apex tetrahedron contributes its centroid weighted by its
    /// signed volume. Returns `None` when the enclosed volume is negligible
    /// (an open or flat shell has no well-defined volumetric center).
    pub fn center_of_mass(&self) -> Option<Vec3A> {
        let mut volume = 0.0;
        let mut weighted = Vec3A::ZERO;

        for [v0, v1, v2] in &self.triangles {
            let v = tetrahedron_signed_volume(*v0, *v1, *v2);
            volume += v;
            // The centroid of a tetrahedron with one vertex at the origin.
            weighted += v * (*v0 + *v1 + *v2) / 4.0;
        }

        if volume.abs() < f32::EPSILON {
            return None;
        }
        Some(weighted / volume)
    }

    /// Returns a copy of the mesh with every vertex translated by the given
    /// offset.
    ///
    /// Centering a scan is `mesh.translated(-center_of_mass)`.
    #[inline]
    pub fn translated(&self, translation: Vec3A) -> TriMesh {
        TriMesh {
            triangles: self
                .triangles
                .iter()
                .map(|tri| tri.map(|v| v + translation))
                .collect(),
        }
    }

    /// Rotates the mesh into its principal-axis frame.
    ///
    /// The mesh is flattened into a point cloud, analyzed with [`Pca3`], and
    /// rebuilt with the same triangle structure from the aligned points. The
    /// returned analysis maps aligned geometry back to the original frame via
    /// [`Pca3::revert_transform`].
    ///
    /// The epsilon determines when the vertex cloud counts as degenerate.
    ///
    /// # Errors
    ///
    /// - [`Pca3Error::NoPoints`]: the mesh has no triangles.
    /// - [`Pca3Error::InsufficientRank`]: the vertices are coincident,
    ///   collinear, or coplanar, so the principal axes are not well defined.
    pub fn align_to_principal_axes(&self, epsilon: f32) -> Result<(TriMesh, Pca3), Pca3Error> {
        let mut points = self.flatten();
        debug!(triangles = self.len(), "computing principal axes of vertex cloud");

        let pca = Pca3::try_from_points(&points, epsilon)?;
        pca.apply_transform(&mut points);

        // The point count is unchanged, so the reshape cannot fail.
        let aligned = TriMesh::from_flattened(&points, self.len())
            .expect("flatten preserves the point count");

        debug!(
            eigenvalues = ?pca.eigenvalues().to_array(),
            "mesh aligned with principal axes"
        );
        Ok((aligned, pca))
    }
}

/// The signed volume of a tetrahedron with one vertex at the origin.
#[inline]
fn tetrahedron_signed_volume(p0: Vec3A, p1: Vec3A, p2: Vec3A) -> f32 {
    p0.dot(p1.cross(p2)) / 6.0
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::point_cloud::centroid_mean3;

    /// A closed unit cube centered at `center`, wound counter-clockwise.
    fn cube(center: Vec3A) -> TriMesh {
        let corner = |x: f32, y: f32, z: f32| center + Vec3A::new(x - 0.5, y - 0.5, z - 0.5);
        let quad = |a: Vec3A, b: Vec3A, c: Vec3A, d: Vec3A| [[a, b, c], [a, c, d]];

        let v000 = corner(0.0, 0.0, 0.0);
        let v100 = corner(1.0, 0.0, 0.0);
        let v010 = corner(0.0, 1.0, 0.0);
        let v110 = corner(1.0, 1.0, 0.0);
        let v001 = corner(0.0, 0.0, 1.0);
        let v101 = corner(1.0, 0.0, 1.0);
        let v011 = corner(0.0, 1.0, 1.0);
        let v111 = corner(1.0, 1.0, 1.0);

        let mut triangles = Vec::new();
        triangles.extend(quad(v000, v010, v110, v100)); // bottom (z = -0.5)
        triangles.extend(quad(v001, v101, v111, v011)); // top (z = +0.5)
        triangles.extend(quad(v000, v100, v101, v001)); // front (y = -0.5)
        triangles.extend(quad(v010, v011, v111, v110)); // back (y = +0.5)
        triangles.extend(quad(v000, v001, v011, v010)); // left (x = -0.5)
        triangles.extend(quad(v100, v110, v111, v101)); // right (x = +0.5)
        TriMesh::new(triangles)
    }

    #[test]
    fn flatten_round_trip() {
        let mesh = cube(Vec3A::new(1.0, 2.0, 3.0));
        let points = mesh.flatten();

        assert_eq!(points.len(), mesh.len() * 3);
        // Triangle-major, vertex-minor: point i belongs to triangle i / 3.
        for (i, point) in points.iter().enumerate() {
            assert_eq!(*point, mesh.triangles[i / 3][i % 3]);
        }

        let rebuilt = TriMesh::from_flattened(&points, mesh.len()).unwrap();
        assert_eq!(rebuilt, mesh);
    }

    #[test]
    fn reshape_rejects_wrong_length() {
        let points = vec![Vec3A::ZERO; 7];
        // Not a multiple of 3.
        assert_eq!(
            TriMesh::from_flattened(&points, 2),
            Err(MeshError::ShapeMismatch {
                expected: 6,
                got: 7
            })
        );
        // A multiple of 3 that disagrees with the triangle count.
        let points = vec![Vec3A::ZERO; 9];
        assert_eq!(
            TriMesh::from_flattened(&points, 2),
            Err(MeshError::ShapeMismatch {
                expected: 6,
                got: 9
            })
        );
    }

    #[test]
    fn cube_mass_properties() {
        let center = Vec3A::new(4.0, -2.0, 7.5);
        let mesh = cube(center);

        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(mesh.center_of_mass().unwrap(), center, epsilon = 1e-3);
    }

    #[test]
    fn flat_shell_has_no_center_of_mass() {
        let mesh = TriMesh::new(vec![[
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        ]]);
        assert!(mesh.center_of_mass().is_none());
    }

    #[test]
    fn centering_moves_center_of_mass_to_origin() {
        let mesh = cube(Vec3A::new(-3.0, 9.0, 0.5));
        let com = mesh.center_of_mass().unwrap();

        let centered = mesh.translated(-com);
        let recentered_com = centered.center_of_mass().unwrap();
        assert!(recentered_com.length() < 1e-3);

        // The cube's vertices are symmetric, so the vertex centroid lands on
        // the origin as well.
        let centroid = centroid_mean3(&centered.flatten()).unwrap();
        assert!(centroid.length() < 1e-3);
    }

    /// An octahedron with apex distances `a`, `b`, `c` along the X, Y, and Z
    /// axes. Every vertex lies on exactly 4 of the 8 faces, so the flattened
    /// triangle soup weights all vertices equally and the covariance of the
    /// soup stays diagonal. A quad-split box does not have this property: each
    /// quad's diagonal vertices appear twice, which biases the covariance and
    /// tilts the principal axes slightly off the box axes.
    fn octahedron(a: f32, b: f32, c: f32) -> TriMesh {
        let mut triangles = Vec::new();
        for sx in [1.0, -1.0] {
            for sy in [1.0, -1.0] {
                for sz in [1.0, -1.0] {
                    triangles.push([
                        Vec3A::new(sx * a, 0.0, 0.0),
                        Vec3A::new(0.0, sy * b, 0.0),
                        Vec3A::new(0.0, 0.0, sz * c),
                    ]);
                }
            }
        }
        TriMesh::new(triangles)
    }

    #[test]
    fn alignment_preserves_structure_and_diagonalizes() {
        // A flat elongated solid, rotated off-axis, like a fin blank on a
        // scanner bed. Uniform vertex multiplicity keeps the principal axes on
        // the solid's own axes, so the aligned extents are its exact half-sizes.
        let rotation = glam::Mat3A::from_euler(glam::EulerRot::XYZ, 0.3, 0.9, -0.4);
        let blank = TriMesh::new(
            octahedron(3.0, 1.0, 0.25)
                .triangles
                .iter()
                .map(|tri| tri.map(|v| rotation * v))
                .collect(),
        );

        let (aligned, pca) = blank.align_to_principal_axes(1e-6).unwrap();
        assert_eq!(aligned.len(), blank.len());

        // Half-extents come back longest first, per the canonical eigenvalue
        // order.
        let aabb = aligned.compute_aabb();
        let extents = (aabb.max - aabb.min) * 0.5;
        assert_relative_eq!(extents.x, 3.0, epsilon = 1e-3);
        assert_relative_eq!(extents.y, 1.0, epsilon = 1e-3);
        assert_relative_eq!(extents.z, 0.25, epsilon = 1e-3);

        // Reverting the aligned vertices recovers the input mesh.
        let mut points = aligned.flatten();
        pca.revert_transform(&mut points);
        let reverted = TriMesh::from_flattened(&points, blank.len()).unwrap();
        for (a, b) in blank.flatten().iter().zip(reverted.flatten().iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-3);
        }
    }

    #[test]
    fn empty_mesh_cannot_be_aligned() {
        let mesh = TriMesh::default();
        assert!(matches!(
            mesh.align_to_principal_axes(1e-6),
            Err(Pca3Error::NoPoints)
        ));
    }
}
