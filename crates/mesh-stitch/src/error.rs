//! Error types for mesh construction and stitching.

use thiserror::Error;

/// Result type alias for stitching operations.
pub type StitchResult<T> = Result<T, StitchError>;

/// Errors that can occur while building or stitching a mesh.
///
/// All variants are fatal: they indicate corrupt input or programmer error,
/// and the operation that raised them produces no partial result. Topological
/// irregularities in well-formed input (unpaired half-edges, partially paired
/// complex edge groups, non-closed meshes) are *not* errors; they are reported
/// through [`Mesh::open_edges`](crate::Mesh::open_edges) and
/// [`Mesh::is_closed`](crate::Mesh::is_closed).
#[derive(Debug, Error)]
pub enum StitchError {
    /// Malformed face-index encoding: bad counts, leftover data, an index out
    /// of range, or a face with fewer than three vertices.
    #[error("malformed input: {details}")]
    MalformedInput { details: String },

    /// Plane fitting produced a normal with negligible magnitude, meaning the
    /// face's vertices are collinear or coincident.
    #[error("face {face_index} is degenerate: vertex loop has no usable normal")]
    DegenerateFace { face_index: usize },

    /// A face's half-edge ring traverses the same directed vertex pair twice.
    #[error("face {face_index} repeats the directed edge {from} -> {to}")]
    MalformedFace { face_index: usize, from: u32, to: u32 },

    /// A face handed to the stitcher already belongs to a mesh.
    #[error("face {face_index} already belongs to mesh {mesh_index}")]
    PreconditionViolated { face_index: usize, mesh_index: u32 },
}
