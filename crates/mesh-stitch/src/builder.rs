//! Construction of faces and their half-edge rings, and the entry point
//! that turns a bag of faces into a stitched [`MeshSet`].

use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::debug;

use crate::error::{StitchError, StitchResult};
use crate::geom::{self, Plane, Projection};
use crate::meshset::MeshSet;
use crate::stitch;
use crate::types::{Face, FaceId, HalfEdge, Tags, Vertex, VertexId};

/// Tolerances used during face construction and stitching.
///
/// These are an explicit parameter bundle rather than process-wide globals;
/// `Default` gives values suitable for roughly unit-scale geometry.
#[derive(Debug, Clone, Copy)]
pub struct StitchParams {
    /// A face is degenerate when the magnitude of its Newell normal falls
    /// below this fraction of the squared extent of its vertex loop.
    pub degenerate_epsilon: f64,
    /// A vertex splits an open edge during T-junction resolution when its
    /// distance to the edge's supporting line is below this fraction of the
    /// edge length.
    pub collinear_epsilon: f64,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            degenerate_epsilon: 1e-12,
            collinear_epsilon: 1e-9,
        }
    }
}

/// Accumulates vertices and independently built faces, then stitches them
/// into a [`MeshSet`].
///
/// This is the staging area equivalent of a half-edge soup: faces added here
/// do not yet belong to any mesh. [`MeshSetBuilder::build`] runs the face
/// stitcher, which pairs opposing half-edges, resolves complex edge
/// incidences, and partitions the faces into edge-connected meshes.
///
/// # Example
///
/// ```
/// use mesh_stitch::MeshSetBuilder;
/// use nalgebra::Point3;
///
/// let mut builder = MeshSetBuilder::new();
/// let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = builder.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// builder.add_face(&[a, b, c]).unwrap();
/// let set = builder.build().unwrap();
/// assert_eq!(set.face_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MeshSetBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    params: StitchParams,
}

impl MeshSetBuilder {
    /// Create an empty builder with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with explicit tolerances.
    pub fn with_params(params: StitchParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Number of vertices added so far.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces added so far.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Add a vertex, returning its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = self.vertices.len() as VertexId;
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add a face from an ordered vertex loop.
    ///
    /// Builds the circular half-edge ring in the given order, fits the plane
    /// (Newell's method, so mildly non-planar loops are tolerated), and
    /// chooses the axis-aligned projection from the dominant normal
    /// component.
    ///
    /// Fails with [`StitchError::MalformedInput`] for loops shorter than
    /// three vertices or referencing unknown vertices, with
    /// [`StitchError::MalformedFace`] when the loop traverses the same
    /// directed vertex pair twice, and with [`StitchError::DegenerateFace`]
    /// when the loop has no usable normal. A repeated *vertex* without a
    /// repeated directed edge is legal.
    pub fn add_face(&mut self, loop_verts: &[VertexId]) -> StitchResult<FaceId> {
        let face_index = self.faces.len();
        self.check_loop(face_index, loop_verts)?;

        let positions: Vec<Point3<f64>> = loop_verts
            .iter()
            .map(|&v| self.vertices[v as usize].position)
            .collect();
        let plane = recalc(face_index, &positions, &self.params)?;
        let projection = Projection::for_normal(&plane.normal);

        Ok(self.push_face(loop_verts, plane, projection))
    }

    /// Add a face derived from an existing face of another mesh set.
    ///
    /// The base face's projection is copied (its sign toggled when `flipped`
    /// is set) so that 2D work done by outer algorithms stays consistent
    /// across the derivation; the plane is recomputed from the new loop.
    /// `loop_verts` index into *this* builder's vertices.
    pub fn derive_face(
        &mut self,
        base: &MeshSet,
        base_face: FaceId,
        loop_verts: &[VertexId],
        flipped: bool,
    ) -> StitchResult<FaceId> {
        let face_index = self.faces.len();
        self.check_loop(face_index, loop_verts)?;

        let positions: Vec<Point3<f64>> = loop_verts
            .iter()
            .map(|&v| self.vertices[v as usize].position)
            .collect();
        let plane = recalc(face_index, &positions, &self.params)?;

        let mut projection = base.faces[base_face as usize].projection;
        if flipped {
            projection.flip = !projection.flip;
        }

        Ok(self.push_face(loop_verts, plane, projection))
    }

    /// Stitch the accumulated faces and assemble the result.
    ///
    /// Consumes the builder. Pairs opposing half-edges (resolving complex
    /// incidences by dihedral-angle order), partitions faces into
    /// edge-connected components, and classifies each resulting mesh as open
    /// or closed, positive or negative.
    pub fn build(self) -> StitchResult<MeshSet> {
        let MeshSetBuilder {
            vertices,
            mut edges,
            mut faces,
            params,
        } = self;

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            "stitching face soup"
        );

        let meshes = stitch::stitch_faces(&vertices, &mut edges, &mut faces, &params)?;

        Ok(MeshSet {
            vertices,
            edges,
            faces,
            meshes,
        })
    }

    fn check_loop(&self, face_index: usize, loop_verts: &[VertexId]) -> StitchResult<()> {
        if loop_verts.len() < 3 {
            return Err(StitchError::MalformedInput {
                details: format!(
                    "face {} has {} vertices, need at least 3",
                    face_index,
                    loop_verts.len()
                ),
            });
        }
        for &v in loop_verts {
            if v as usize >= self.vertices.len() {
                return Err(StitchError::MalformedInput {
                    details: format!(
                        "face {} references vertex {}, but only {} vertices exist",
                        face_index,
                        v,
                        self.vertices.len()
                    ),
                });
            }
        }

        let n = loop_verts.len();
        let mut seen: HashSet<(VertexId, VertexId)> = HashSet::with_capacity(n);
        for i in 0..n {
            let from = loop_verts[i];
            let to = loop_verts[(i + 1) % n];
            if !seen.insert((from, to)) {
                return Err(StitchError::MalformedFace {
                    face_index,
                    from,
                    to,
                });
            }
        }
        Ok(())
    }

    fn push_face(
        &mut self,
        loop_verts: &[VertexId],
        plane: Plane,
        projection: Projection,
    ) -> FaceId {
        let face_id = self.faces.len() as FaceId;
        let n = loop_verts.len();
        let base = self.edges.len() as u32;

        for (i, &origin) in loop_verts.iter().enumerate() {
            self.edges.push(HalfEdge {
                origin,
                face: face_id,
                prev: base + ((i + n - 1) % n) as u32,
                next: base + ((i + 1) % n) as u32,
                twin: None,
                tags: Tags::empty(),
            });
        }

        self.faces.push(Face {
            edge: base,
            n_edges: n,
            plane,
            projection,
            mesh: None,
            tags: Tags::empty(),
        });
        face_id
    }
}

/// Fit a plane through a vertex loop.
///
/// The normal comes from Newell's method relative to the loop centroid, the
/// offset from the centroid itself. Fails with
/// [`StitchError::DegenerateFace`] when the normal magnitude is negligible
/// relative to the loop's squared extent.
pub(crate) fn recalc(
    face_index: usize,
    positions: &[Point3<f64>],
    params: &StitchParams,
) -> StitchResult<Plane> {
    let newell = geom::newell_normal(positions);

    let mut aabb = geom::Aabb::empty();
    for p in positions {
        aabb.grow(p);
    }
    let extent_sq = (aabb.max - aabb.min).norm_squared();

    if newell.norm() <= params.degenerate_epsilon * extent_sq || extent_sq == 0.0 {
        return Err(StitchError::DegenerateFace { face_index });
    }

    let normal = newell.normalize();
    let centroid = geom::loop_centroid(positions);
    Ok(Plane::from_point_normal(&centroid, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Axis;
    use nalgebra::Vector3;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn triangle_builder() -> (MeshSetBuilder, [VertexId; 3]) {
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = builder.add_vertex(Point3::new(0.0, 1.0, 0.0));
        (builder, [a, b, c])
    }

    #[test]
    fn test_add_face_builds_circular_ring() {
        let (mut builder, [a, b, c]) = triangle_builder();
        builder.add_face(&[a, b, c]).unwrap();

        let face = &builder.faces[0];
        assert_eq!(face.n_edges, 3);

        // Walk the ring forward and backward.
        let e0 = face.edge as usize;
        let e1 = builder.edges[e0].next as usize;
        let e2 = builder.edges[e1].next as usize;
        assert_eq!(builder.edges[e2].next as usize, e0);
        assert_eq!(builder.edges[e0].prev as usize, e2);
        assert_eq!(builder.edges[e1].prev as usize, e0);

        assert_eq!(builder.edges[e0].origin, a);
        assert_eq!(builder.edges[e1].origin, b);
        assert_eq!(builder.edges[e2].origin, c);
        for e in &builder.edges {
            assert_eq!(e.face, 0);
            assert!(e.twin.is_none());
        }
    }

    #[test]
    fn test_add_face_plane_and_projection() {
        let (mut builder, [a, b, c]) = triangle_builder();
        builder.add_face(&[a, b, c]).unwrap();

        let face = &builder.faces[0];
        assert!(approx_eq(face.plane.normal.z, 1.0));
        assert!(approx_eq(face.plane.offset, 0.0));
        assert_eq!(face.projection.axis, Axis::Z);
        assert!(!face.projection.flip);
    }

    #[test]
    fn test_reversed_loop_flips_projection() {
        let (mut builder, [a, b, c]) = triangle_builder();
        builder.add_face(&[c, b, a]).unwrap();

        let face = &builder.faces[0];
        assert!(approx_eq(face.plane.normal.z, -1.0));
        assert!(face.projection.flip);
    }

    #[test]
    fn test_face_too_small_is_malformed_input() {
        let (mut builder, [a, b, _]) = triangle_builder();
        let err = builder.add_face(&[a, b]).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_unknown_vertex_is_malformed_input() {
        let (mut builder, [a, b, _]) = triangle_builder();
        let err = builder.add_face(&[a, b, 99]).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_duplicate_directed_edge_is_malformed_face() {
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let err = builder.add_face(&[a, b, a, b]).unwrap_err();
        assert!(matches!(
            err,
            StitchError::MalformedFace { from, to, .. } if from == a && to == b
        ));
    }

    #[test]
    fn test_repeated_vertex_without_repeated_edge_is_legal() {
        // A bow-tie style loop revisits vertex `a` but never repeats a
        // directed edge.
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = builder.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let d = builder.add_vertex(Point3::new(-1.0, 0.0, 0.0));
        let e = builder.add_vertex(Point3::new(-1.0, 1.0, 0.0));
        assert!(builder.add_face(&[a, b, c, a, e, d]).is_ok());
    }

    #[test]
    fn test_collinear_face_is_degenerate() {
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = builder.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let err = builder.add_face(&[a, b, c]).unwrap_err();
        assert!(matches!(err, StitchError::DegenerateFace { face_index: 0 }));
    }

    #[test]
    fn test_coincident_vertices_are_degenerate() {
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(1.0, 1.0, 1.0));
        let b = builder.add_vertex(Point3::new(1.0, 1.0, 1.0));
        let c = builder.add_vertex(Point3::new(1.0, 1.0, 1.0));
        let err = builder.add_face(&[a, b, c]).unwrap_err();
        assert!(matches!(err, StitchError::DegenerateFace { .. }));
    }

    #[test]
    fn test_nonplanar_quad_is_tolerated() {
        // A quad with one vertex lifted off the plane still gets a usable
        // Newell normal.
        let mut builder = MeshSetBuilder::new();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = builder.add_vertex(Point3::new(1.0, 1.0, 0.3));
        let d = builder.add_vertex(Point3::new(0.0, 1.0, 0.0));
        builder.add_face(&[a, b, c, d]).unwrap();
        let n = builder.faces[0].plane.normal;
        assert!(n.dot(&Vector3::new(0.0, 0.0, 1.0)) > 0.9);
    }

    #[test]
    fn test_derive_face_copies_projection() {
        let (mut builder, [a, b, c]) = triangle_builder();
        builder.add_face(&[a, b, c]).unwrap();
        let base = builder.build().unwrap();

        let mut derived = MeshSetBuilder::new();
        let a2 = derived.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b2 = derived.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let c2 = derived.add_vertex(Point3::new(0.0, 2.0, 0.0));

        let f = derived.derive_face(&base, 0, &[a2, b2, c2], false).unwrap();
        assert_eq!(
            derived.faces[f as usize].projection,
            base.faces[0].projection
        );

        let g = derived.derive_face(&base, 0, &[c2, b2, a2], true).unwrap();
        assert_eq!(
            derived.faces[g as usize].projection.axis,
            base.faces[0].projection.axis
        );
        assert_ne!(
            derived.faces[g as usize].projection.flip,
            base.faces[0].projection.flip
        );
        // The plane is recomputed from the new (reversed) loop.
        assert!(approx_eq(derived.faces[g as usize].plane.normal.z, -1.0));
    }
}
