//! STL import and the scan orientation pipeline.
//!
//! Supports both ASCII and binary STL. Only the vertex data is kept; stored
//! facet normals are ignored, as they are frequently wrong in scanner output.
//!
//! Binary layout:
//!
//! ```text
//! UINT8[80]    – header (ignored)
//! UINT32       – number of triangles
//! foreach triangle
//!     REAL32[3] – normal (ignored)
//!     REAL32[3] – vertex 1
//!     REAL32[3] – vertex 2
//!     REAL32[3] – vertex 3
//!     UINT16    – attribute byte count
//! end
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3A;
use thiserror::Error;
use tracing::{debug, info};

use crate::mesh::TriMesh;
use crate::point_cloud::{Pca3, Pca3Error};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Errors that can occur while importing STL data.
#[derive(Error, Debug)]
pub enum StlError {
    /// The file does not have an `.stl` extension.
    #[error("unsupported file format: {path} (expected an .stl file)")]
    UnsupportedFormat {
        /// The offending path.
        path: String,
    },
    /// The file content is not valid STL.
    #[error("invalid STL content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },
    /// The binary triangle count disagrees with the data actually present.
    #[error("invalid STL face count: header promises {expected}, data holds {got}")]
    FaceCountMismatch {
        /// The number of triangles the header promises.
        expected: u32,
        /// The number of triangles the data holds.
        got: u32,
    },
    /// The mesh encloses no volume, so its center of mass is undefined and the
    /// scan cannot be centered.
    #[error("mesh encloses no volume; center of mass is undefined")]
    NoVolume,
    /// The vertex cloud is degenerate and cannot be aligned.
    #[error(transparent)]
    Degenerate(#[from] Pca3Error),
    /// An I/O error from the underlying filesystem.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StlError {
    fn invalid_content(message: impl Into<String>) -> StlError {
        StlError::InvalidContent {
            message: message.into(),
        }
    }
}

/// Loads a triangle mesh from an STL file, detecting ASCII versus binary
/// automatically.
///
/// # Errors
///
/// - [`StlError::UnsupportedFormat`]: the path does not end in `.stl`.
/// - [`StlError::Io`]: the file cannot be read.
/// - [`StlError::InvalidContent`] / [`StlError::FaceCountMismatch`]: the file
///   is not valid STL.
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<TriMesh, StlError> {
    let path = path.as_ref();

    // Gate on the extension before touching the file, mirroring how scan data
    // directories mix spreadsheets and meshes.
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"))
    {
        return Err(StlError::UnsupportedFormat {
            path: path.display().to_string(),
        });
    }

    info!(path = %path.display(), "importing STL data");
    let bytes = fs::read(path)?;
    let mesh = read_stl(&bytes)?;
    debug!(triangles = mesh.len(), "STL import complete");
    Ok(mesh)
}

/// Parses STL data from an in-memory buffer, detecting ASCII versus binary.
///
/// ASCII files start with `solid`; binary files carry an 80-byte header that
/// usually contains null bytes. Some binary exporters also write headers
/// beginning with `solid`, so the header alone is not trusted.
///
/// # Errors
///
/// See [`load_stl`].
pub fn read_stl(bytes: &[u8]) -> Result<TriMesh, StlError> {
    if bytes.len() < 6 {
        return Err(StlError::invalid_content("file too small to be valid STL"));
    }

    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let looks_ascii = head.trim_ascii_start().starts_with(b"solid") && !head.contains(&0);

    if looks_ascii {
        read_stl_ascii(bytes)
    } else {
        read_stl_binary(bytes)
    }
}

/// Parses a binary STL buffer.
fn read_stl_binary(bytes: &[u8]) -> Result<TriMesh, StlError> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(StlError::invalid_content("binary STL header is truncated"));
    }

    let count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let available = (body.len() / TRIANGLE_SIZE) as u32;
    if available < count {
        return Err(StlError::FaceCountMismatch {
            expected: count,
            got: available,
        });
    }

    let mut triangles = Vec::with_capacity(count as usize);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(count as usize) {
        // Skip the 12-byte normal; read the three vertices.
        triangles.push([
            read_vertex(&record[12..24]),
            read_vertex(&record[24..36]),
            read_vertex(&record[36..48]),
        ]);
    }

    Ok(TriMesh::new(triangles))
}

/// Reads a vertex from 12 bytes (3 little-endian f32s).
fn read_vertex(buf: &[u8]) -> Vec3A {
    let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
    Vec3A::new(f(0), f(4), f(8))
}

/// Parses an ASCII STL buffer.
fn read_stl_ascii(bytes: &[u8]) -> Result<TriMesh, StlError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| StlError::invalid_content("ASCII STL is not valid UTF-8"))?;

    let mut triangles = Vec::new();
    let mut vertices: Vec<Vec3A> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let mut coord = || -> Result<f32, StlError> {
                    parts
                        .next()
                        .ok_or_else(|| StlError::invalid_content("vertex with missing coordinate"))?
                        .parse()
                        .map_err(|_| StlError::invalid_content("vertex with malformed coordinate"))
                };
                vertices.push(Vec3A::new(coord()?, coord()?, coord()?));
            }
            Some("endfacet") => {
                if vertices.len() != 3 {
                    return Err(StlError::invalid_content(format!(
                        "facet with {} vertices",
                        vertices.len()
                    )));
                }
                triangles.push([vertices[0], vertices[1], vertices[2]]);
                vertices.clear();
            }
            Some("endsolid") => break,
            // "solid", "facet", "outer", "endloop", blank lines.
            _ => {}
        }
    }

    Ok(TriMesh::new(triangles))
}

/// Imports an STL scan and orients it into its canonical frame.
///
/// The full pipeline of a new scan record: load the mesh, translate it so its
/// volumetric center of mass sits at the origin, then rotate it into its
/// principal-axis frame. Returns the oriented mesh together with the analysis
/// needed to map results back to the scanner frame. On any failure the error is
/// surfaced immediately; partial geometry is never returned.
///
/// # Errors
///
/// Everything [`load_stl`] raises, plus [`StlError::NoVolume`] for open shells
/// and [`StlError::Degenerate`] when the vertex cloud has no well-defined
/// principal axes.
pub fn load_oriented_stl<P: AsRef<Path>>(
    path: P,
    epsilon: f32,
) -> Result<(TriMesh, Pca3), StlError> {
    let mesh = load_stl(path)?;

    let center_of_mass = mesh.center_of_mass().ok_or(StlError::NoVolume)?;
    debug!(center_of_mass = ?center_of_mass.to_array(), "centering scan at the origin");
    let centered = mesh.translated(-center_of_mass);

    let (aligned, pca) = centered.align_to_principal_axes(epsilon)?;
    info!(triangles = aligned.len(), "scan centered and aligned");
    Ok((aligned, pca))
}
