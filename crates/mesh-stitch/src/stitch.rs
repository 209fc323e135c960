//! The face stitcher.
//!
//! Given a collection of independently built faces, the stitcher pairs
//! opposing half-edges into two-sided edges, resolves **complex edges**
//! (vertex pairs where more than two half-edges meet) by sorting the incident
//! faces around the shared line in dihedral-angle order, splits open edges at
//! T-junctions, and partitions the faces into edge-connected components via
//! disjoint-set union. Each component becomes one [`Mesh`].
//!
//! Unpaired half-edges are a normal outcome, reported through the resulting
//! meshes' `open_edges`; the stitcher never drops a face.

use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::builder::StitchParams;
use crate::dsu::DisjointSet;
use crate::error::{StitchError, StitchResult};
use crate::geom::{ccw_angle_about, project_onto_segment};
use crate::meshset::signed_volume_of_faces;
use crate::types::{EdgeId, Face, FaceId, HalfEdge, Mesh, Tags, Vertex, VertexId};

/// Half-edges incident on an undirected vertex pair `(a, b)` with `a <= b`.
#[derive(Debug, Default)]
struct EdgeLists {
    /// Half-edges traversing `a -> b`.
    fwd: Vec<EdgeId>,
    /// Half-edges traversing `b -> a`.
    rev: Vec<EdgeId>,
}

/// A participant in complex-edge resolution: one half-edge on the shared
/// vertex pair, with the direction its face's material-bounding normal points
/// around the shared line.
#[derive(Debug, Clone, Copy)]
struct EdgeOrder {
    edge: EdgeId,
    face: FaceId,
    /// True when the half-edge traverses the canonical pair in reverse.
    reversed: bool,
    face_dir: Vector3<f64>,
    angle: f64,
}

/// Stitch a face soup into edge-connected meshes.
///
/// On success every pairable half-edge has its `twin` set, every face has its
/// `mesh` assigned, and the returned meshes carry their open/closed edge
/// lists and negative-volume classification.
pub(crate) fn stitch_faces(
    vertices: &[Vertex],
    edges: &mut Vec<HalfEdge>,
    faces: &mut [Face],
    params: &StitchParams,
) -> StitchResult<Vec<Mesh>> {
    let mut stitcher = FaceStitcher {
        vertices,
        edges,
        faces,
        params,
        groups: DisjointSet::new(0),
    };
    stitcher.prepare()?;

    let all: Vec<EdgeId> = (0..stitcher.edges.len() as u32).collect();
    let open = stitcher.pair_pass(all)?;
    let open = stitcher.resolve_open_chains(open)?;

    Ok(stitcher.assemble(open))
}

struct FaceStitcher<'a> {
    vertices: &'a [Vertex],
    edges: &'a mut Vec<HalfEdge>,
    faces: &'a mut [Face],
    params: &'a StitchParams,
    groups: DisjointSet,
}

impl FaceStitcher<'_> {
    /// Check preconditions and reset any stale pairing state.
    fn prepare(&mut self) -> StitchResult<()> {
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(mesh_index) = face.mesh {
                return Err(StitchError::PreconditionViolated {
                    face_index,
                    mesh_index,
                });
            }
        }
        for edge in self.edges.iter_mut() {
            edge.twin = None;
        }
        self.groups = DisjointSet::new(self.faces.len());
        Ok(())
    }

    #[inline]
    fn dest(&self, e: EdgeId) -> VertexId {
        self.edges[self.edges[e as usize].next as usize].origin
    }

    /// Group a pool of half-edges by undirected vertex pair.
    fn build_edge_map(
        &self,
        pool: &[EdgeId],
    ) -> StitchResult<HashMap<(VertexId, VertexId), EdgeLists>> {
        let mut map: HashMap<(VertexId, VertexId), EdgeLists> =
            HashMap::with_capacity(pool.len());

        for &e in pool {
            let from = self.edges[e as usize].origin;
            let to = self.dest(e);
            let (key, reversed) = if from <= to {
                ((from, to), false)
            } else {
                ((to, from), true)
            };

            let lists = map.entry(key).or_default();
            let list = if reversed { &lists.rev } else { &lists.fwd };
            // The builder rejects rings that repeat a directed edge, but a
            // merged or hand-assembled arena can still smuggle one in.
            if list
                .iter()
                .any(|&other| self.edges[other as usize].face == self.edges[e as usize].face)
            {
                return Err(StitchError::MalformedFace {
                    face_index: self.edges[e as usize].face as usize,
                    from,
                    to,
                });
            }
            if reversed {
                lists.rev.push(e);
            } else {
                lists.fwd.push(e);
            }
        }
        Ok(map)
    }

    /// Run simple and complex pairing over a pool of unpaired half-edges.
    /// Returns the half-edges still open afterwards.
    fn pair_pass(&mut self, pool: Vec<EdgeId>) -> StitchResult<Vec<EdgeId>> {
        let map = self.build_edge_map(&pool)?;

        // Process vertex pairs in sorted order so that pairing, logging, and
        // DSU evolution are independent of hash iteration order.
        let mut keys: Vec<(VertexId, VertexId)> = map.keys().copied().collect();
        keys.sort_unstable();

        let mut still_open = Vec::new();
        let mut simple = 0usize;
        let mut complex = 0usize;

        for key in keys {
            let lists = &map[&key];
            match (lists.fwd.len(), lists.rev.len()) {
                (1, 1) => {
                    self.make_twins(lists.fwd[0], lists.rev[0]);
                    simple += 1;
                }
                (_, 0) => still_open.extend_from_slice(&lists.fwd),
                (0, _) => still_open.extend_from_slice(&lists.rev),
                _ => {
                    self.resolve_complex(key, lists, &mut still_open);
                    complex += 1;
                }
            }
        }

        debug!(
            pool = pool.len(),
            simple_pairs = simple,
            complex_groups = complex,
            open = still_open.len(),
            "edge pairing pass"
        );
        Ok(still_open)
    }

    fn make_twins(&mut self, e1: EdgeId, e2: EdgeId) {
        self.edges[e1 as usize].twin = Some(e2);
        self.edges[e2 as usize].twin = Some(e1);
        let f1 = self.edges[e1 as usize].face;
        let f2 = self.edges[e2 as usize].face;
        self.groups.union(f1, f2);
    }

    /// Pair the half-edges of a complex vertex pair by sorting them around
    /// the shared line in counter-clockwise dihedral order.
    ///
    /// Each half-edge contributes its face's outward normal, negated when the
    /// half-edge runs against the canonical `a -> b` direction; faces that
    /// bound the same solid sector then become angular neighbours. Walking
    /// the sorted list cyclically, every reversed entry is paired with an
    /// immediately following forward entry. Participants with no such
    /// neighbour stay open.
    fn resolve_complex(
        &mut self,
        (a, b): (VertexId, VertexId),
        lists: &EdgeLists,
        still_open: &mut Vec<EdgeId>,
    ) {
        let pa = self.vertices[a as usize].position;
        let pb = self.vertices[b as usize].position;
        let span = pb - pa;
        if span.norm_squared() <= f64::EPSILON {
            warn!(
                v1 = a,
                v2 = b,
                "complex edge with coincident endpoints left open"
            );
            still_open.extend_from_slice(&lists.fwd);
            still_open.extend_from_slice(&lists.rev);
            return;
        }
        let edge_dir = span.normalize();

        // The face normal of any face containing the edge is perpendicular
        // to it, so the first forward face's normal is a valid, deterministic
        // reference direction.
        let base_dir = self.faces[self.edges[lists.fwd[0] as usize].face as usize]
            .plane
            .normal;

        let mut ordering: Vec<EdgeOrder> = Vec::with_capacity(lists.fwd.len() + lists.rev.len());
        for (list, reversed) in [(&lists.fwd, false), (&lists.rev, true)] {
            for &e in list {
                let face = self.edges[e as usize].face;
                let normal = self.faces[face as usize].plane.normal;
                let face_dir = if reversed { -normal } else { normal };
                ordering.push(EdgeOrder {
                    edge: e,
                    face,
                    reversed,
                    face_dir,
                    angle: ccw_angle_about(&edge_dir, &base_dir, &face_dir),
                });
            }
        }

        ordering.sort_by(|x, y| {
            x.angle
                .partial_cmp(&y.angle)
                .unwrap_or(std::cmp::Ordering::Equal)
                // Reversed-orientation edges precede forward ones at the
                // same angle, so a zero-dihedral rev/fwd pair stays adjacent.
                .then_with(|| y.reversed.cmp(&x.reversed))
                .then_with(|| x.face.cmp(&y.face))
        });

        let n = ordering.len();
        let mut paired = vec![false; n];
        for j in 0..n {
            let k = (j + 1) % n;
            if ordering[j].reversed && !ordering[k].reversed && !paired[j] && !paired[k] {
                self.make_twins(ordering[j].edge, ordering[k].edge);
                paired[j] = true;
                paired[k] = true;
            }
        }

        let mut open_here = 0usize;
        for (j, entry) in ordering.iter().enumerate() {
            if !paired[j] {
                still_open.push(entry.edge);
                open_here += 1;
            }
        }
        if open_here > 0 {
            warn!(
                v1 = a,
                v2 = b,
                participants = n,
                unpaired = open_here,
                "complex edge group only partially paired"
            );
        }
    }

    /// Resolve T-junctions among the remaining open half-edges.
    ///
    /// An open half-edge whose segment passes through other open-edge
    /// endpoints is split at those vertices; the refined edges are then run
    /// through the pairing passes again. Repeats until a pass performs no
    /// split. Ordinary boundary loops (no collinear counterpart) are left
    /// untouched and stay open.
    fn resolve_open_chains(&mut self, mut open: Vec<EdgeId>) -> StitchResult<Vec<EdgeId>> {
        loop {
            if open.is_empty() {
                return Ok(open);
            }

            let mut endpoints: Vec<VertexId> = open
                .iter()
                .flat_map(|&e| [self.edges[e as usize].origin, self.dest(e)])
                .collect();
            endpoints.sort_unstable();
            endpoints.dedup();

            let mut refined = Vec::with_capacity(open.len());
            let mut splits = 0usize;
            for &e in &open {
                let a = self.edges[e as usize].origin;
                let b = self.dest(e);
                let pa = self.vertices[a as usize].position;
                let pb = self.vertices[b as usize].position;
                let len = (pb - pa).norm();

                let mut hits: Vec<(f64, VertexId)> = Vec::new();
                if len > 0.0 {
                    let tol = self.params.collinear_epsilon;
                    for &v in &endpoints {
                        if v == a || v == b {
                            continue;
                        }
                        let p = self.vertices[v as usize].position;
                        if let Some((t, dist)) = project_onto_segment(&p, &pa, &pb) {
                            if dist <= tol * len && t > tol && t < 1.0 - tol {
                                hits.push((t, v));
                            }
                        }
                    }
                }

                if hits.is_empty() {
                    refined.push(e);
                } else {
                    hits.sort_by(|x, y| {
                        x.0.partial_cmp(&y.0)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| x.1.cmp(&y.1))
                    });
                    splits += hits.len();
                    self.split_open_edge(e, &hits, &mut refined);
                }
            }

            if splits == 0 {
                return Ok(refined);
            }
            debug!(splits, "split open edges at T-junction vertices");
            open = self.pair_pass(refined)?;
        }
    }

    /// Split the open half-edge `e` at the given vertices (sorted by
    /// parameter along the edge), inserting new ring edges after it. The
    /// sub-edges, including `e` itself, are appended to `out`.
    fn split_open_edge(&mut self, e: EdgeId, hits: &[(f64, VertexId)], out: &mut Vec<EdgeId>) {
        debug_assert!(self.edges[e as usize].twin.is_none());
        out.push(e);
        let face = self.edges[e as usize].face;
        let mut prev = e;
        for &(_, v) in hits {
            let next = self.edges[prev as usize].next;
            let id = self.edges.len() as EdgeId;
            self.edges.push(HalfEdge {
                origin: v,
                face,
                prev,
                next,
                twin: None,
                tags: Tags::empty(),
            });
            self.edges[prev as usize].next = id;
            self.edges[next as usize].prev = id;
            self.faces[face as usize].n_edges += 1;
            out.push(id);
            prev = id;
        }
    }

    /// Bucket faces into meshes by DSU component, classify edges as open or
    /// closed, and flag negative (inward-facing) closed meshes.
    fn assemble(&mut self, open: Vec<EdgeId>) -> Vec<Mesh> {
        let (index_of_set, set_sizes) = self.groups.to_sets();

        let mut meshes: Vec<Mesh> = set_sizes
            .iter()
            .map(|&size| Mesh {
                faces: Vec::with_capacity(size),
                open_edges: Vec::new(),
                closed_edges: Vec::new(),
                is_negative: false,
            })
            .collect();

        for (face_id, face) in self.faces.iter_mut().enumerate() {
            let mesh_index = index_of_set[face_id];
            face.mesh = Some(mesh_index);
            meshes[mesh_index as usize].faces.push(face_id as FaceId);
        }

        for mesh in &mut meshes {
            for i in 0..mesh.faces.len() {
                let face_id = mesh.faces[i];
                for e in self.faces[face_id as usize].ring(self.edges) {
                    match self.edges[e as usize].twin {
                        None => mesh.open_edges.push(e),
                        Some(twin) if e < twin => mesh.closed_edges.push(e),
                        Some(_) => {}
                    }
                }
            }
            if mesh.open_edges.is_empty() {
                let volume =
                    signed_volume_of_faces(self.vertices, self.edges, self.faces, &mesh.faces);
                mesh.is_negative = volume < 0.0;
            }
        }

        let closed = meshes.iter().filter(|m| m.is_closed()).count();
        info!(
            meshes = meshes.len(),
            closed,
            open_meshes = meshes.len() - closed,
            open_edges = open.len(),
            "face stitching complete"
        );
        meshes
    }
}
