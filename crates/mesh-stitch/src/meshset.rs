//! The owning root of a stitched mesh graph: vertex storage, the half-edge
//! arena, the face table, and the meshes partitioning them.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};
use tracing::{debug, info};

use crate::builder::{MeshSetBuilder, StitchParams};
use crate::error::{StitchError, StitchResult};
use crate::geom::{self, Aabb};
use crate::types::{EdgeId, Face, FaceId, HalfEdge, Mesh, Vertex, VertexId};

/// An owning collection of meshes sharing one vertex store.
///
/// All topology is index-based: half-edges reference vertices, faces, and
/// each other through indices into the set's flat arenas, so `clone()` is a
/// deep copy of the whole graph by construction. A `MeshSet` is an isolated
/// owning root; independent sets can be processed on independent threads, but
/// a single set is strictly single-threaded.
///
/// # Example
///
/// ```
/// use mesh_stitch::MeshSet;
/// use nalgebra::Point3;
///
/// // A unit cube: 8 points, 6 outward-facing quads.
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(1.0, 0.0, 1.0),
///     Point3::new(1.0, 1.0, 1.0),
///     Point3::new(0.0, 1.0, 1.0),
/// ];
/// let face_indices = [
///     4, 0, 3, 2, 1, // bottom
///     4, 4, 5, 6, 7, // top
///     4, 0, 1, 5, 4, // front
///     4, 1, 2, 6, 5, // right
///     4, 2, 3, 7, 6, // back
///     4, 3, 0, 4, 7, // left
/// ];
/// let set = MeshSet::from_indexed(&points, 6, &face_indices).unwrap();
/// assert_eq!(set.meshes.len(), 1);
/// assert!(set.meshes[0].is_closed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshSet {
    /// Vertex storage; every half-edge origin points into this array.
    pub vertices: Vec<Vertex>,
    /// The half-edge arena.
    pub edges: Vec<HalfEdge>,
    /// All faces, in construction order.
    pub faces: Vec<Face>,
    /// Edge-connected components, each grouping a subset of `faces`.
    pub meshes: Vec<Mesh>,
}

impl MeshSet {
    /// Build a mesh set from a point list and a flat face-index encoding.
    ///
    /// The encoding is `[n0, v00, v01, .., n1, v10, ..]`: for each of
    /// `n_faces` faces, a vertex count followed by that many indices into
    /// `points`. Fails with [`StitchError::MalformedInput`] when the encoding
    /// is truncated, has leftover data, a count below 3, or an index out of
    /// range.
    pub fn from_indexed(
        points: &[Point3<f64>],
        n_faces: usize,
        face_indices: &[u32],
    ) -> StitchResult<Self> {
        Self::from_indexed_with_params(points, n_faces, face_indices, StitchParams::default())
    }

    /// [`MeshSet::from_indexed`] with explicit tolerances.
    pub fn from_indexed_with_params(
        points: &[Point3<f64>],
        n_faces: usize,
        face_indices: &[u32],
        params: StitchParams,
    ) -> StitchResult<Self> {
        let mut builder = MeshSetBuilder::with_params(params);
        for &p in points {
            builder.add_vertex(p);
        }

        let mut cursor = 0usize;
        for face in 0..n_faces {
            let Some(&count) = face_indices.get(cursor) else {
                return Err(StitchError::MalformedInput {
                    details: format!("index data exhausted at face {face}"),
                });
            };
            cursor += 1;
            let count = count as usize;
            let end = cursor + count;
            if end > face_indices.len() {
                return Err(StitchError::MalformedInput {
                    details: format!(
                        "face {face} claims {count} vertices but only {} indices remain",
                        face_indices.len() - cursor
                    ),
                });
            }
            builder.add_face(&face_indices[cursor..end])?;
            cursor = end;
        }
        if cursor != face_indices.len() {
            return Err(StitchError::MalformedInput {
                details: format!(
                    "{} leftover entries after {n_faces} faces",
                    face_indices.len() - cursor
                ),
            });
        }

        builder.build()
    }

    /// Consolidate several mesh sets into one.
    ///
    /// Walks every half-edge of every mesh, collects the distinct vertices
    /// actually referenced (in first-use order), copies them into a fresh
    /// vertex store, and rewrites all origins. Topology, tags, and mesh
    /// classification are preserved; unreferenced vertices are dropped.
    pub fn merge(sets: Vec<MeshSet>) -> MeshSet {
        let mut vertices = Vec::new();
        let mut edges: Vec<HalfEdge> = Vec::new();
        let mut faces: Vec<Face> = Vec::new();
        let mut meshes: Vec<Mesh> = Vec::new();

        for set in sets {
            let edge_offset = edges.len() as u32;
            let face_offset = faces.len() as u32;
            let mesh_offset = meshes.len() as u32;

            let mut remap: HashMap<VertexId, VertexId> = HashMap::new();
            for mesh in &set.meshes {
                for &f in &mesh.faces {
                    for e in set.faces[f as usize].ring(&set.edges) {
                        let v = set.edges[e as usize].origin;
                        remap.entry(v).or_insert_with(|| {
                            let new = vertices.len() as VertexId;
                            vertices.push(set.vertices[v as usize].clone());
                            new
                        });
                    }
                }
            }

            for edge in &set.edges {
                edges.push(HalfEdge {
                    origin: remap[&edge.origin],
                    face: edge.face + face_offset,
                    prev: edge.prev + edge_offset,
                    next: edge.next + edge_offset,
                    twin: edge.twin.map(|t| t + edge_offset),
                    tags: edge.tags,
                });
            }
            for face in &set.faces {
                faces.push(Face {
                    edge: face.edge + edge_offset,
                    mesh: face.mesh.map(|m| m + mesh_offset),
                    ..face.clone()
                });
            }
            for mesh in set.meshes {
                meshes.push(Mesh {
                    faces: mesh.faces.iter().map(|&f| f + face_offset).collect(),
                    open_edges: mesh.open_edges.iter().map(|&e| e + edge_offset).collect(),
                    closed_edges: mesh
                        .closed_edges
                        .iter()
                        .map(|&e| e + edge_offset)
                        .collect(),
                    is_negative: mesh.is_negative,
                });
            }
        }

        info!(
            vertices = vertices.len(),
            faces = faces.len(),
            meshes = meshes.len(),
            "merged mesh sets"
        );
        MeshSet {
            vertices,
            edges,
            faces,
            meshes,
        }
    }

    /// Number of vertices in storage.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of faces across all meshes.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of meshes.
    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Position of vertex `v`.
    #[inline]
    pub fn position(&self, v: VertexId) -> Point3<f64> {
        self.vertices[v as usize].position
    }

    /// The vertex half-edge `e` points at (the origin of its ring
    /// successor).
    #[inline]
    pub fn edge_dest(&self, e: EdgeId) -> VertexId {
        self.edges[self.edges[e as usize].next as usize].origin
    }

    /// All half-edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        0..self.edges.len() as EdgeId
    }

    /// The vertex ids around face `f`, in ring order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.faces[f as usize]
            .ring(&self.edges)
            .map(move |e| self.edges[e as usize].origin)
    }

    /// The vertex positions around face `f`, in ring order.
    pub fn face_positions(&self, f: FaceId) -> Vec<Point3<f64>> {
        self.face_vertices(f)
            .map(|v| self.vertices[v as usize].position)
            .collect()
    }

    /// Mean of face `f`'s loop vertex positions.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        geom::loop_centroid(&self.face_positions(f))
    }

    /// Area of face `f` (half the magnitude of its Newell normal).
    pub fn face_area(&self, f: FaceId) -> f64 {
        geom::newell_normal(&self.face_positions(f)).norm() * 0.5
    }

    /// Face `f`'s loop projected into its 2D coordinate system.
    pub fn face_projected_vertices(&self, f: FaceId) -> Vec<Point2<f64>> {
        let projection = self.faces[f as usize].projection;
        self.face_positions(f)
            .iter()
            .map(|p| projection.project(p))
            .collect()
    }

    /// Axis-aligned bounding box of face `f`.
    pub fn face_aabb(&self, f: FaceId) -> Aabb {
        let mut aabb = Aabb::empty();
        for p in self.face_positions(f) {
            aabb.grow(&p);
        }
        aabb
    }

    /// Axis-aligned bounding box of mesh `m` (union of its face boxes).
    pub fn mesh_aabb(&self, m: usize) -> Aabb {
        let mut aabb = Aabb::empty();
        for &f in &self.meshes[m].faces {
            aabb.union(&self.face_aabb(f));
        }
        aabb
    }

    /// Axis-aligned bounding box of the whole set (union of per-mesh boxes).
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for m in 0..self.meshes.len() {
            aabb.union(&self.mesh_aabb(m));
        }
        aabb
    }

    /// Signed volume of mesh `m` via the divergence theorem, fanning each
    /// face from its first loop vertex. Positive for outward-facing closed
    /// meshes; not meaningful for open meshes.
    pub fn mesh_signed_volume(&self, m: usize) -> f64 {
        signed_volume_of_faces(&self.vertices, &self.edges, &self.faces, &self.meshes[m].faces)
    }

    /// Random-access iterator over all faces, in stable order: the
    /// concatenation of `meshes[i].faces`.
    pub fn face_iter(&self) -> FaceIter<'_> {
        FaceIter {
            set: self,
            mesh: 0,
            face: 0,
        }
    }

    /// Check the universal half-edge invariants over the whole set.
    pub fn validate_topology(&self) -> TopologyReport {
        let mut report = TopologyReport {
            vertex_count: self.vertices.len(),
            face_count: self.faces.len(),
            mesh_count: self.meshes.len(),
            ring_links_consistent: true,
            twins_consistent: true,
            rings_closed: true,
            open_edge_count: 0,
            closed_edge_count: 0,
        };

        for e in self.edge_ids() {
            let edge = &self.edges[e as usize];
            if self.edges[edge.next as usize].prev != e || self.edges[edge.prev as usize].next != e
            {
                report.ring_links_consistent = false;
            }
            match edge.twin {
                None => report.open_edge_count += 1,
                Some(t) => {
                    let twin = &self.edges[t as usize];
                    if twin.twin != Some(e)
                        || twin.origin != self.edge_dest(e)
                        || edge.origin != self.edge_dest(t)
                    {
                        report.twins_consistent = false;
                    }
                    if e < t {
                        report.closed_edge_count += 1;
                    }
                }
            }
        }

        for face in &self.faces {
            let mut current = face.edge;
            for _ in 0..face.n_edges {
                current = self.edges[current as usize].next;
            }
            if current != face.edge {
                report.rings_closed = false;
            }
        }

        debug!(
            consistent = report.is_consistent(),
            open = report.open_edge_count,
            closed = report.closed_edge_count,
            "topology validation"
        );
        report
    }
}

/// Result of [`MeshSet::validate_topology`].
#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    pub vertex_count: usize,
    pub face_count: usize,
    pub mesh_count: usize,
    /// Half-edges with no twin across the whole set.
    pub open_edge_count: usize,
    /// Twin pairs across the whole set.
    pub closed_edge_count: usize,
    /// `next.prev == self` and `prev.next == self` for every half-edge.
    pub ring_links_consistent: bool,
    /// Twin links are mutual and traverse opposite directions.
    pub twins_consistent: bool,
    /// Walking `n_edges` steps from a face's entry edge returns to it.
    pub rings_closed: bool,
}

impl TopologyReport {
    /// True when every checked invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.ring_links_consistent && self.twins_consistent && self.rings_closed
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(
            f,
            "  {} vertices, {} faces, {} meshes",
            self.vertex_count, self.face_count, self.mesh_count
        )?;
        writeln!(
            f,
            "  {} closed edge pairs, {} open half-edges",
            self.closed_edge_count, self.open_edge_count
        )?;
        writeln!(f, "  ring links consistent: {}", self.ring_links_consistent)?;
        writeln!(f, "  twins consistent: {}", self.twins_consistent)?;
        writeln!(f, "  rings closed: {}", self.rings_closed)?;
        Ok(())
    }
}

/// Sum of fan-triangle signed volumes over the given faces, divided by six.
pub(crate) fn signed_volume_of_faces(
    vertices: &[Vertex],
    edges: &[HalfEdge],
    faces: &[Face],
    face_ids: &[FaceId],
) -> f64 {
    let mut six_volume = 0.0;
    for &f in face_ids {
        let mut ring = faces[f as usize].ring(edges);
        let Some(e0) = ring.next() else { continue };
        let p0 = vertices[edges[e0 as usize].origin as usize].position.coords;
        let mut prev: Option<nalgebra::Vector3<f64>> = None;
        for e in ring {
            let p = vertices[edges[e as usize].origin as usize].position.coords;
            if let Some(q) = prev {
                six_volume += p0.dot(&q.cross(&p));
            }
            prev = Some(p);
        }
    }
    six_volume / 6.0
}

/// Random-access iterator over the faces of a [`MeshSet`], visiting
/// `meshes[0].faces`, then `meshes[1].faces`, and so on.
///
/// Dereference (`face_id`) is O(1); [`FaceIter::advance`] walks at most one
/// mesh entry per mesh crossed; [`FaceIter::distance_from`] yields the signed
/// face-count difference between two iterators over the same set.
#[derive(Debug, Clone, Copy)]
pub struct FaceIter<'a> {
    set: &'a MeshSet,
    mesh: usize,
    face: usize,
}

impl<'a> FaceIter<'a> {
    /// The past-the-end iterator.
    pub fn end(set: &'a MeshSet) -> Self {
        Self {
            set,
            mesh: set.meshes.len(),
            face: 0,
        }
    }

    /// True when this iterator is past the last face.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.mesh >= self.set.meshes.len()
    }

    /// The face id under the iterator. Panics on the end iterator.
    #[inline]
    pub fn face_id(&self) -> FaceId {
        self.set.meshes[self.mesh].faces[self.face]
    }

    fn fwd(&mut self, n: usize) {
        if self.is_end() {
            return;
        }
        self.face += n;
        while self.face >= self.set.meshes[self.mesh].faces.len() {
            self.face -= self.set.meshes[self.mesh].faces.len();
            self.mesh += 1;
            if self.is_end() {
                self.face = 0;
                return;
            }
        }
    }

    fn rev_by(&mut self, mut n: usize) {
        while n > self.face {
            n -= self.face;
            if self.mesh == 0 {
                self.face = 0;
                return;
            }
            self.mesh -= 1;
            self.face = self.set.meshes[self.mesh].faces.len();
        }
        self.face -= n;
    }

    /// Move the iterator by a signed number of faces, clamping at the ends.
    pub fn advance(&mut self, n: isize) {
        if n > 0 {
            self.fwd(n as usize);
        } else if n < 0 {
            self.rev_by(n.unsigned_abs());
        }
    }

    fn linear_offset(&self) -> usize {
        let mut offset = self.face;
        for m in 0..self.mesh {
            offset += self.set.meshes[m].faces.len();
        }
        offset
    }

    /// Signed number of faces between `other` and `self`.
    pub fn distance_from(&self, other: &FaceIter<'_>) -> isize {
        self.linear_offset() as isize - other.linear_offset() as isize
    }
}

impl Iterator for FaceIter<'_> {
    type Item = FaceId;

    fn next(&mut self) -> Option<FaceId> {
        if self.is_end() {
            return None;
        }
        let id = self.face_id();
        self.fwd(1);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.face_count() - self.linear_offset();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FaceIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn cube_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    fn cube_indices() -> Vec<u32> {
        vec![
            4, 0, 3, 2, 1, // bottom
            4, 4, 5, 6, 7, // top
            4, 0, 1, 5, 4, // front
            4, 1, 2, 6, 5, // right
            4, 2, 3, 7, 6, // back
            4, 3, 0, 4, 7, // left
        ]
    }

    fn unit_cube() -> MeshSet {
        MeshSet::from_indexed(&cube_points(), 6, &cube_indices()).unwrap()
    }

    #[test]
    fn test_cube_is_one_closed_positive_mesh() {
        let set = unit_cube();
        assert_eq!(set.mesh_count(), 1);
        let mesh = &set.meshes[0];
        assert!(mesh.is_closed());
        assert!(!mesh.is_negative);
        assert_eq!(mesh.faces.len(), 6);
        assert_eq!(mesh.closed_edges.len(), 12);
        assert!(mesh.open_edges.is_empty());
        assert!(approx_eq(set.mesh_signed_volume(0), 1.0));
    }

    #[test]
    fn test_cube_aabb() {
        let set = unit_cube();
        let aabb = set.aabb();
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_cube_topology_is_consistent() {
        let set = unit_cube();
        let report = set.validate_topology();
        assert!(report.is_consistent(), "{report}");
        assert_eq!(report.closed_edge_count, 12);
        assert_eq!(report.open_edge_count, 0);
    }

    #[test]
    fn test_inverted_cube_is_negative() {
        let points = cube_points();
        // Reverse every loop so all normals point inward.
        let faces: Vec<Vec<u32>> = cube_indices()
            .chunks(5)
            .map(|chunk| chunk[1..].iter().rev().copied().collect())
            .collect();
        let mut flat = Vec::new();
        for f in &faces {
            flat.push(f.len() as u32);
            flat.extend_from_slice(f);
        }
        let set = MeshSet::from_indexed(&points, 6, &flat).unwrap();
        assert_eq!(set.mesh_count(), 1);
        assert!(set.meshes[0].is_closed());
        assert!(set.meshes[0].is_negative);
        assert!(set.mesh_signed_volume(0) < 0.0);
    }

    #[test]
    fn test_truncated_encoding_is_malformed() {
        let err = MeshSet::from_indexed(&cube_points(), 6, &cube_indices()[..20]).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_leftover_encoding_is_malformed() {
        let mut indices = cube_indices();
        indices.push(3);
        let err = MeshSet::from_indexed(&cube_points(), 6, &indices).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_count_below_three_is_malformed() {
        let points = cube_points();
        let indices = [2, 0, 1];
        let err = MeshSet::from_indexed(&points, 1, &indices).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let points = cube_points();
        let indices = [3, 0, 1, 42];
        let err = MeshSet::from_indexed(&points, 1, &indices).unwrap_err();
        assert!(matches!(err, StitchError::MalformedInput { .. }));
    }

    #[test]
    fn test_degenerate_face_fails_construction() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let err = MeshSet::from_indexed(&points, 1, &[3, 0, 1, 2]).unwrap_err();
        assert!(matches!(err, StitchError::DegenerateFace { .. }));
    }

    #[test]
    fn test_face_iter_visits_all_faces_in_order() {
        let set = unit_cube();
        let ids: Vec<FaceId> = set.face_iter().collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(set.face_iter().len(), 6);
    }

    #[test]
    fn test_face_iter_advance_and_distance_across_meshes() {
        // Two disjoint triangles give two meshes of one face each.
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
        ];
        let indices = [3, 0, 1, 2, 3, 3, 4, 5];
        let set = MeshSet::from_indexed(&points, 2, &indices).unwrap();
        assert_eq!(set.mesh_count(), 2);

        let begin = set.face_iter();
        let mut it = set.face_iter();
        it.advance(1);
        assert_eq!(it.face_id(), 1);
        assert_eq!(it.distance_from(&begin), 1);

        it.advance(1);
        assert!(it.is_end());
        assert_eq!(it.distance_from(&begin), 2);
        assert_eq!(FaceIter::end(&set).distance_from(&begin), 2);

        it.advance(-2);
        assert_eq!(it.face_id(), 0);
        assert_eq!(it.distance_from(&begin), 0);
    }

    #[test]
    fn test_clone_preserves_structure() {
        let set = unit_cube();
        let cloned = set.clone();

        assert_eq!(cloned.vertex_count(), set.vertex_count());
        assert_eq!(cloned.face_count(), set.face_count());
        assert_eq!(cloned.mesh_count(), set.mesh_count());
        for (a, b) in set.edges.iter().zip(&cloned.edges) {
            assert_eq!(a.origin, b.origin);
            assert_eq!(a.next, b.next);
            assert_eq!(a.prev, b.prev);
            assert_eq!(a.twin, b.twin);
            assert_eq!(a.face, b.face);
        }
        assert!(cloned.validate_topology().is_consistent());
    }

    #[test]
    fn test_clone_preserves_tags() {
        let mut set = unit_cube();
        set.vertices[0].tags.set(2);
        set.faces[3].tags.set(7);
        set.edges[5].tags.set(0);

        let cloned = set.clone();
        assert!(cloned.vertices[0].tags.contains(2));
        assert!(cloned.faces[3].tags.contains(7));
        assert!(cloned.edges[5].tags.contains(0));
    }

    #[test]
    fn test_merge_consolidates_vertices() {
        let a = unit_cube();
        let shifted: Vec<Point3<f64>> = cube_points()
            .iter()
            .map(|p| Point3::new(p.x + 5.0, p.y, p.z))
            .collect();
        let b = MeshSet::from_indexed(&shifted, 6, &cube_indices()).unwrap();
        let merged = MeshSet::merge(vec![a, b]);

        assert_eq!(merged.vertex_count(), 16);
        assert_eq!(merged.face_count(), 12);
        assert_eq!(merged.mesh_count(), 2);
        assert!(merged.validate_topology().is_consistent());
        assert!(merged.meshes.iter().all(|m| m.is_closed()));
    }

    #[test]
    fn test_merge_drops_unreferenced_vertices() {
        let mut a = unit_cube();
        a.vertices.push(Vertex::from_coords(99.0, 99.0, 99.0));
        let merged = MeshSet::merge(vec![a]);
        assert_eq!(merged.vertex_count(), 8);
    }

    #[test]
    fn test_face_geometry_queries() {
        let set = unit_cube();
        // Face 1 is the top quad at z = 1.
        let centroid = set.face_centroid(1);
        assert!(approx_eq(centroid.z, 1.0));
        assert!(approx_eq(set.face_area(1), 1.0));

        let aabb = set.face_aabb(1);
        assert!(approx_eq(aabb.min.z, 1.0));
        assert!(approx_eq(aabb.max.z, 1.0));

        let projected = set.face_projected_vertices(1);
        assert_eq!(projected.len(), 4);
        let mut area = 0.0;
        for i in 0..4 {
            let p = projected[i];
            let q = projected[(i + 1) % 4];
            area += p.x * q.y - q.x * p.y;
        }
        assert!(area > 0.0, "projected polygon must keep positive area");
    }
}
