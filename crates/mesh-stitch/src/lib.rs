//! Half-edge mesh construction and face stitching for CSG pipelines.
//!
//! This crate takes an unstructured bag of polygonal faces, each an ordered
//! loop of vertex references, and assembles it into a topologically valid
//! half-edge representation suitable for Boolean operations:
//!
//! - **Edge pairing**: opposing half-edges across faces become mutual twins.
//! - **Complex edges**: where more than two faces meet along a vertex pair,
//!   the incident faces are sorted around the shared line in dihedral-angle
//!   order and paired so that faces bounding the same solid sector join.
//! - **T-junctions**: an open edge spanning a finer chain of open edges on
//!   the opposite side is split at the chain's vertices and re-paired.
//! - **Components**: faces are partitioned into edge-connected meshes,
//!   classified closed or open; closed meshes with negative oriented volume
//!   (inward-facing cavities) are flagged negative.
//!
//! Topological irregularities in well-formed input are never fatal: unpaired
//! half-edges are reported as a mesh's `open_edges`, and the caller decides
//! whether an open mesh is acceptable.
//!
//! # Coordinate System
//!
//! Right-handed, with faces wound **counter-clockwise when viewed from
//! outside**, so face normals point outward by the right-hand rule. A closed
//! mesh wound this way has positive signed volume.
//!
//! # Quick Start
//!
//! ```
//! use mesh_stitch::MeshSet;
//! use nalgebra::Point3;
//!
//! // Two triangles sharing an edge, encoded as [count, indices..] records.
//! let points = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(1.5, 1.0, 0.0),
//! ];
//! let face_indices = [3, 0, 1, 2, 3, 1, 3, 2];
//!
//! let set = MeshSet::from_indexed(&points, 2, &face_indices).unwrap();
//! assert_eq!(set.meshes.len(), 1);
//! assert_eq!(set.meshes[0].closed_edges.len(), 1);
//! assert!(!set.meshes[0].is_closed()); // the outer boundary stays open
//! ```
//!
//! Faces can also be assembled one at a time through
//! [`MeshSetBuilder`], which is the path outer algorithms (e.g. a Boolean
//! evaluator deriving sub-faces via [`MeshSetBuilder::derive_face`]) use.
//!
//! # Error Handling
//!
//! Fatal conditions (malformed index encodings, degenerate faces, rings
//! repeating a directed edge, stitching already-owned faces) surface as
//! [`StitchError`]; nothing partial is produced. Everything else is a normal
//! outcome reported on the constructed meshes.

mod builder;
mod dsu;
mod error;
mod geom;
mod meshset;
mod poly;
mod stitch;
mod types;

pub use builder::{MeshSetBuilder, StitchParams};
pub use error::{StitchError, StitchResult};
pub use geom::{Aabb, Axis, Plane, Projection};
pub use meshset::{FaceIter, MeshSet, TopologyReport};
pub use poly::{PolyFace, Polyhedron};
pub use types::{
    EdgeId, Face, FaceId, HalfEdge, Mesh, MeshIndex, RingEdges, Tags, Vertex, VertexId,
};
