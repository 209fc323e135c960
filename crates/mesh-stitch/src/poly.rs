//! Conversion to and from a legacy indexed-polyhedron representation.
//!
//! The polyhedron format is a flat point list plus per-face index loops with
//! a manifold id, as produced by older CSG pipelines. Converters are built
//! entirely on the public mesh-set surface: face count is preserved in both
//! directions, vertex count modulo coincident-point merging, and manifold ids
//! per face.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::builder::{MeshSetBuilder, StitchParams};
use crate::error::{StitchError, StitchResult};
use crate::meshset::MeshSet;

/// A polygonal face of an indexed polyhedron.
#[derive(Debug, Clone)]
pub struct PolyFace {
    /// Ordered indices into the polyhedron's point list.
    pub indices: Vec<u32>,
    /// The manifold (mesh) the face belongs to; -1 when unknown.
    pub manifold_id: i32,
}

/// A legacy indexed-polyhedron: shared points plus polygonal index loops.
#[derive(Debug, Clone, Default)]
pub struct Polyhedron {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<PolyFace>,
}

impl Polyhedron {
    /// Extract an indexed polyhedron from a mesh set.
    ///
    /// Faces are emitted in the set's stable iteration order and carry their
    /// mesh index as manifold id.
    pub fn from_meshset(set: &MeshSet) -> Polyhedron {
        let points = set.vertices.iter().map(|v| v.position).collect();
        let mut faces = Vec::with_capacity(set.face_count());
        for f in set.face_iter() {
            faces.push(PolyFace {
                indices: set.face_vertices(f).collect(),
                manifold_id: set.faces[f as usize].mesh.map_or(-1, |m| m as i32),
            });
        }
        Polyhedron { points, faces }
    }

    /// Stitch the polyhedron into a mesh set.
    ///
    /// Exactly coincident points are merged first (polyhedra written by
    /// triangle-soup exporters duplicate corner points per face), then the
    /// faces are rebuilt and stitched. Manifold ids are re-derived from the
    /// resulting component partition.
    pub fn to_meshset(&self) -> StitchResult<MeshSet> {
        self.to_meshset_with_params(StitchParams::default())
    }

    /// [`Polyhedron::to_meshset`] with explicit tolerances.
    pub fn to_meshset_with_params(&self, params: StitchParams) -> StitchResult<MeshSet> {
        let mut builder = MeshSetBuilder::with_params(params);

        let mut remap = Vec::with_capacity(self.points.len());
        let mut welded: HashMap<(u64, u64, u64), u32> = HashMap::new();
        for p in &self.points {
            let key = (p.x.to_bits(), p.y.to_bits(), p.z.to_bits());
            let id = *welded.entry(key).or_insert_with(|| builder.add_vertex(*p));
            remap.push(id);
        }
        if welded.len() < self.points.len() {
            debug!(
                points = self.points.len(),
                welded = welded.len(),
                "merged coincident polyhedron points"
            );
        }

        let mut loop_verts = Vec::new();
        for (face_index, face) in self.faces.iter().enumerate() {
            loop_verts.clear();
            for &i in &face.indices {
                let Some(&v) = remap.get(i as usize) else {
                    return Err(StitchError::MalformedInput {
                        details: format!(
                            "polyhedron face {face_index} references point {i}, but only {} points exist",
                            self.points.len()
                        ),
                    });
                };
                loop_verts.push(v);
            }
            builder.add_face(&loop_verts)?;
        }

        builder.build()
    }
}
