//! Principal-axis alignment and oriented bounding boxes for fin scan geometry.
//!
//! Wind-tunnel models and 3D-scanned surfboard fins arrive in whatever orientation
//! the scanner or CAD export left them in. Before any geometric measurement
//! (bounding box, profile extents) is meaningful, the scan has to be re-centered
//! and re-oriented into a canonical frame. This crate does exactly that:
//!
//! 1. [`point_cloud::Pca2`] / [`point_cloud::Pca3`] compute the centroid,
//!    covariance matrix, and eigen-decomposition of a point cloud and rotate it
//!    so its principal axes coincide with the coordinate axes.
//! 2. [`obb::Obb2`] / [`obb::Obb3`] measure the axis-aligned extents of the
//!    aligned cloud, which become an oriented bounding box once mapped back to
//!    the original frame with the forward rotation.
//! 3. [`mesh::TriMesh`] flattens a triangle-soup mesh (the shape STL data comes
//!    in) into a point cloud for alignment and reconstructs it afterwards.
//! 4. [`stl`] imports STL files and runs the full center-and-align pipeline.
//!
//! The measurements this enables are invariant to the scan's original position
//! and orientation; see the `rotation_demo` example for the 2D walkthrough.

#![warn(missing_docs)]

pub mod mesh;
pub mod obb;
pub mod point_cloud;
pub mod stl;

pub use obvhs::aabb::Aabb;

pub use crate::{
    mesh::{MeshError, TriMesh},
    obb::{Aabb2, Obb2, Obb3, ObbError},
    point_cloud::{Pca2, Pca2Error, Pca3, Pca3Error},
};
