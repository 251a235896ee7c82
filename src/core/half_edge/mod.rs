//! The half edge mesh container.
//!
//! # Notes on the representation
//!
//! - Opposite half edges are stored implicitly: the two halves of an edge
//!   always sit next to each other in the underlying vector, at indices `2k`
//!   and `2k + 1`. Finding the opposite half edge is flipping the lowest
//!   index bit; mapping between edge and half edge handles is a shift.
//! - Every half edge stores its `prev` handle in addition to `next`. This
//!   costs one handle per half edge and makes all boundary re-linking in
//!   `add_face` O(1) per corner.
//! - Boundary invariant: if a vertex lies on the boundary, its `outgoing`
//!   handle refers to a boundary (face-less) half edge. Several operations
//!   rely on this.

use std::{fmt, marker::PhantomData, ops, slice};

use cgmath::{Point3, Vector3, prelude::*};
use optional::Optioned as Opt;
use smallvec::SmallVec;

use crate::{
    error::{ElementKind, InvalidHandleError, TopologyError},
    handle::{hsize, Handle, VertexHandle, FaceHandle, EdgeHandle, HalfEdgeHandle},
    map::{DenseMap, Handles},
};
use super::{Checked, Config, FaceKind, TriConfig, PolyConfig};

pub(crate) mod adj;
mod normals;



/// A polygon mesh storing connectivity as half edges, plus vertex positions
/// and optional normals.
///
/// Vertices and faces are appended via [`add_vertex`][Self::add_vertex] and
/// [`add_face`][Self::add_face]; elements are never removed, so handle
/// indices are stable for the lifetime of the mesh. `add_face` validates its
/// input completely before touching any storage: on error the mesh is
/// unchanged.
///
/// Cloning a mesh deep-copies everything; the clone shares no storage with
/// the original.
pub struct HalfEdgeMesh<C: Config = PolyConfig> {
    vertices: DenseMap<VertexHandle, Vertex>,
    half_edges: DenseMap<HalfEdgeHandle, HalfEdge>,
    faces: DenseMap<FaceHandle, Face>,

    positions: DenseMap<VertexHandle, Point3<f64>>,
    vertex_normals: Option<DenseMap<VertexHandle, Vector3<f64>>>,
    face_normals: Option<DenseMap<FaceHandle, Vector3<f64>>>,

    _config: PhantomData<C>,
}

/// A [`HalfEdgeMesh`] that only accepts triangular faces.
pub type TriMesh = HalfEdgeMesh<TriConfig>;

/// A [`HalfEdgeMesh`] that accepts faces of arbitrary valence.
pub type PolyMesh = HalfEdgeMesh<PolyConfig>;

/// Data stored per vertex.
#[derive(Clone, Copy)]
pub(crate) struct Vertex {
    /// One outgoing half edge.
    ///
    /// - `None` if the vertex is isolated.
    /// - A boundary half edge if the vertex lies on the boundary.
    /// - Arbitrary otherwise.
    outgoing: Opt<Checked<HalfEdgeHandle>>,
}

/// Data stored per face: one arbitrary inner half edge of its cycle. Set at
/// creation to the half edge leaving the first given vertex and never
/// changed afterwards, so `fv` yields the vertices in the order they were
/// given to `add_face`.
#[derive(Clone, Copy)]
pub(crate) struct Face {
    edge: Checked<HalfEdgeHandle>,
}

/// Data stored per half edge.
#[derive(Clone, Copy)]
pub(crate) struct HalfEdge {
    /// The face this half edge belongs to, `None` on the boundary.
    face: Opt<Checked<FaceHandle>>,

    /// The vertex this half edge points to.
    target: Checked<VertexHandle>,

    /// Next half edge in the cycle around the face (or hole).
    next: Checked<HalfEdgeHandle>,

    /// Previous half edge in that cycle (`self[next].prev == self`).
    prev: Checked<HalfEdgeHandle>,
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Vertex {{ outgoing: {:?} }}", self.outgoing)
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Face {{ edge: {:?} }}", self.edge)
    }
}

impl fmt::Debug for HalfEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "HalfEdge {{ target: {:?}, next: {:?}, prev: {:?}, face: {:?} }}",
            self.target, self.next, self.prev, self.face,
        )
    }
}

impl<C: Config> fmt::Debug for HalfEdgeMesh<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HalfEdgeMesh")
            .field("vertices", &self.vertices)
            .field("half_edges", &self.half_edges)
            .field("faces", &self.faces)
            .field("positions", &self.positions)
            .finish()
    }
}

impl<C: Config> Clone for HalfEdgeMesh<C> {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            half_edges: self.half_edges.clone(),
            faces: self.faces.clone(),
            positions: self.positions.clone(),
            vertex_normals: self.vertex_normals.clone(),
            face_normals: self.face_normals.clone(),
            _config: PhantomData,
        }
    }
}

impl<C: Config> Default for HalfEdgeMesh<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets `next` and `prev` handles in one go. The two always have to be
/// written together, this macro makes it impossible to forget one side.
macro_rules! set_next_prev {
    ($mesh:ident, $prev:tt -> $next:tt) => {{
        $mesh[$prev].next = $next;
        $mesh[$next].prev = $prev;
    }};
}


// ===========================================================================
// ===== Handle validation and internal helpers
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: DenseMap::new(),
            half_edges: DenseMap::new(),
            faces: DenseMap::new(),
            positions: DenseMap::new(),
            vertex_normals: None,
            face_normals: None,
            _config: PhantomData,
        }
    }

    pub(crate) fn check_vertex(
        &self,
        vh: VertexHandle,
    ) -> Result<Checked<VertexHandle>, InvalidHandleError> {
        if self.vertices.contains_handle(vh) {
            Ok(unsafe { Checked::new(vh) })
        } else {
            Err(InvalidHandleError::new(ElementKind::Vertex, vh.idx()))
        }
    }

    pub(crate) fn check_face(
        &self,
        fh: FaceHandle,
    ) -> Result<Checked<FaceHandle>, InvalidHandleError> {
        if self.faces.contains_handle(fh) {
            Ok(unsafe { Checked::new(fh) })
        } else {
            Err(InvalidHandleError::new(ElementKind::Face, fh.idx()))
        }
    }

    pub(crate) fn check_half_edge(
        &self,
        heh: HalfEdgeHandle,
    ) -> Result<Checked<HalfEdgeHandle>, InvalidHandleError> {
        if self.half_edges.contains_handle(heh) {
            Ok(unsafe { Checked::new(heh) })
        } else {
            Err(InvalidHandleError::new(ElementKind::HalfEdge, heh.idx()))
        }
    }

    /// Validates the edge handle and returns its half edge with the lower
    /// index.
    pub(crate) fn checked_half_of(
        &self,
        eh: EdgeHandle,
    ) -> Result<Checked<HalfEdgeHandle>, InvalidHandleError> {
        let heh = HalfEdgeHandle::lower_half_of(eh);
        if self.half_edges.contains_handle(heh) {
            Ok(unsafe { Checked::new(heh) })
        } else {
            Err(InvalidHandleError::new(ElementKind::Edge, eh.idx()))
        }
    }

    /// Tries to find the half edge from `from` to `to`. Returns `None` if
    /// the two vertices are not connected.
    fn he_between(
        &self,
        from: Checked<VertexHandle>,
        to: Checked<VertexHandle>,
    ) -> Option<Checked<HalfEdgeHandle>> {
        self.circulate_around_vertex(from)
            .find(|&outgoing| self[outgoing].target == to)
    }

    /// Walks around the target vertex of `start_edge` (over incoming half
    /// edges) until one satisfies `predicate`. Returns `None` after a full
    /// lap without a match.
    fn find_incoming_he(
        &self,
        start_edge: Checked<HalfEdgeHandle>,
        mut predicate: impl FnMut(Checked<HalfEdgeHandle>) -> bool,
    ) -> Option<Checked<HalfEdgeHandle>> {
        let mut incoming = start_edge;
        loop {
            if predicate(incoming) {
                return Some(incoming);
            }

            let next = self[incoming].next.twin();
            if next == start_edge {
                return None;
            }

            incoming = next;
        }
    }

    /// Adds the two half edges between `from` and `to`, partially
    /// initialized: `target` and `face` (no face) are correct, but `next`
    /// and `prev` hold dummy values that the caller must overwrite before
    /// they are read. The `outgoing` fields of the vertices are untouched.
    /// Returns the half edge pointing to `to`.
    unsafe fn add_edge_partially(
        &mut self,
        from: Checked<VertexHandle>,
        to: Checked<VertexHandle>,
    ) -> Checked<HalfEdgeHandle> {
        let face = Opt::none();
        let next = Checked::new(HalfEdgeHandle::new(0));
        let prev = Checked::new(HalfEdgeHandle::new(0));

        self.half_edges.push(HalfEdge { target: from, face, next, prev });
        let out = self.half_edges.push(HalfEdge { target: to, face, next, prev });

        Checked::new(out)
    }
}

macro_rules! impl_index {
    ($handle:ident, $field:ident, $out:ty) => {
        impl<C: Config> ops::Index<Checked<$handle>> for HalfEdgeMesh<C> {
            type Output = $out;

            #[inline(always)]
            fn index(&self, idx: Checked<$handle>) -> &Self::Output {
                unsafe { self.$field.get_unchecked(*idx) }
            }
        }

        impl<C: Config> ops::IndexMut<Checked<$handle>> for HalfEdgeMesh<C> {
            #[inline(always)]
            fn index_mut(&mut self, idx: Checked<$handle>) -> &mut Self::Output {
                unsafe { self.$field.get_unchecked_mut(*idx) }
            }
        }
    }
}

impl_index!(VertexHandle, vertices, Vertex);
impl_index!(FaceHandle, faces, Face);
impl_index!(HalfEdgeHandle, half_edges, HalfEdge);


// ===========================================================================
// ===== Counts, element access and geometry
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// Number of vertices. Equals the number of successful `add_vertex`
    /// calls.
    pub fn n_vertices(&self) -> hsize {
        self.vertices.num_elements()
    }

    /// Number of faces.
    pub fn n_faces(&self) -> hsize {
        self.faces.num_elements()
    }

    /// Number of full edges (always half the number of half edges).
    pub fn n_edges(&self) -> hsize {
        self.half_edges.num_elements() / 2
    }

    /// Number of half edges.
    pub fn n_halfedges(&self) -> hsize {
        self.half_edges.num_elements()
    }

    pub fn contains_vertex(&self, vh: VertexHandle) -> bool {
        self.vertices.contains_handle(vh)
    }

    pub fn contains_face(&self, fh: FaceHandle) -> bool {
        self.faces.contains_handle(fh)
    }

    /// All vertex positions as one contiguous `N x 3` slice, ordered by
    /// vertex index. This is the authoritative storage, not a copy.
    pub fn points(&self) -> &[Point3<f64>] {
        self.positions.as_slice()
    }

    /// Mutable view of the vertex positions. Writes through this slice are
    /// immediately visible to every subsequent read; there is no
    /// copy-on-write behind it.
    pub fn points_mut(&mut self) -> &mut [Point3<f64>] {
        self.positions.as_mut_slice()
    }

    /// Position of one vertex.
    pub fn point(&self, vh: VertexHandle) -> Result<Point3<f64>, InvalidHandleError> {
        self.check_vertex(vh)?;
        Ok(self.positions[vh])
    }

    /// Overwrites the position of one vertex.
    pub fn set_point(
        &mut self,
        vh: VertexHandle,
        position: Point3<f64>,
    ) -> Result<(), InvalidHandleError> {
        self.check_vertex(vh)?;
        self.positions[vh] = position;
        Ok(())
    }

    /// The two endpoint vertices of an edge.
    pub fn edge_endpoints(
        &self,
        eh: EdgeHandle,
    ) -> Result<[VertexHandle; 2], InvalidHandleError> {
        let a = self.checked_half_of(eh)?;
        let b = a.twin();
        Ok([*self[a].target, *self[b].target])
    }

    /// The vertex a half edge points to.
    pub fn halfedge_target(
        &self,
        heh: HalfEdgeHandle,
    ) -> Result<VertexHandle, InvalidHandleError> {
        let heh = self.check_half_edge(heh)?;
        Ok(*self[heh].target)
    }

    /// The opposite half edge (other half of the same edge).
    pub fn halfedge_opposite(
        &self,
        heh: HalfEdgeHandle,
    ) -> Result<HalfEdgeHandle, InvalidHandleError> {
        let heh = self.check_half_edge(heh)?;
        Ok(*heh.twin())
    }

    /// The next half edge in the cycle around the same face (or hole).
    pub fn halfedge_next(
        &self,
        heh: HalfEdgeHandle,
    ) -> Result<HalfEdgeHandle, InvalidHandleError> {
        let heh = self.check_half_edge(heh)?;
        Ok(*self[heh].next)
    }

    /// The face a half edge belongs to, `None` for boundary half edges.
    pub fn halfedge_face(
        &self,
        heh: HalfEdgeHandle,
    ) -> Result<Option<FaceHandle>, InvalidHandleError> {
        let heh = self.check_half_edge(heh)?;
        Ok(self[heh].face.into_option().map(|f| *f))
    }

    /// Returns `true` if the vertex has no adjacent edges at all.
    pub fn is_isolated_vertex(&self, vh: VertexHandle) -> Result<bool, InvalidHandleError> {
        let vh = self.check_vertex(vh)?;
        Ok(self[vh].outgoing.is_none())
    }

    /// Returns `true` if the vertex lies on the boundary (or is isolated).
    ///
    /// Thanks to the boundary-outgoing invariant this is O(1): a boundary
    /// vertex always stores a boundary half edge as its `outgoing` handle.
    pub fn is_boundary_vertex(&self, vh: VertexHandle) -> Result<bool, InvalidHandleError> {
        let vh = self.check_vertex(vh)?;
        Ok(match self[vh].outgoing.into_option() {
            None => true,
            Some(outgoing) => self[outgoing].face.is_none(),
        })
    }

    /// Returns `true` if at most one face is adjacent to the edge.
    pub fn is_boundary_edge(&self, eh: EdgeHandle) -> Result<bool, InvalidHandleError> {
        let he = self.checked_half_of(eh)?;
        Ok(self[he].face.is_none() || self[he.twin()].face.is_none())
    }
}


// ===========================================================================
// ===== Normal storage
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// Allocates per-vertex normal storage (zero-initialized) if it does not
    /// exist yet. Idempotent. The values are meaningless until
    /// [`update_normals`][Self::update_normals] has run.
    pub fn request_vertex_normals(&mut self) {
        if self.vertex_normals.is_none() {
            self.vertex_normals = Some(
                DenseMap::from_elem(Vector3::zero(), self.n_vertices() as usize)
            );
        }
    }

    /// Allocates per-face normal storage if it does not exist yet.
    /// Idempotent.
    pub fn request_face_normals(&mut self) {
        if self.face_normals.is_none() {
            self.face_normals = Some(
                DenseMap::from_elem(Vector3::zero(), self.n_faces() as usize)
            );
        }
    }

    pub fn has_vertex_normals(&self) -> bool {
        self.vertex_normals.is_some()
    }

    pub fn has_face_normals(&self) -> bool {
        self.face_normals.is_some()
    }

    /// Per-vertex normals (`N x 3`, vertex index order), or `None` if never
    /// requested. Only meaningful after [`update_normals`][Self::update_normals].
    pub fn vertex_normals(&self) -> Option<&[Vector3<f64>]> {
        self.vertex_normals.as_ref().map(|m| m.as_slice())
    }

    pub fn vertex_normals_mut(&mut self) -> Option<&mut [Vector3<f64>]> {
        self.vertex_normals.as_mut().map(|m| m.as_mut_slice())
    }

    /// Per-face normals, or `None` if never requested.
    pub fn face_normals(&self) -> Option<&[Vector3<f64>]> {
        self.face_normals.as_ref().map(|m| m.as_slice())
    }

    pub fn face_normals_mut(&mut self) -> Option<&mut [Vector3<f64>]> {
        self.face_normals.as_mut().map(|m| m.as_mut_slice())
    }

    pub(crate) fn face_normals_map(&self) -> Option<&DenseMap<FaceHandle, Vector3<f64>>> {
        self.face_normals.as_ref()
    }

    pub(crate) fn take_face_normals(&mut self) -> Option<DenseMap<FaceHandle, Vector3<f64>>> {
        self.face_normals.take()
    }

    pub(crate) fn put_back_face_normals(&mut self, m: DenseMap<FaceHandle, Vector3<f64>>) {
        self.face_normals = Some(m);
    }

    pub(crate) fn take_vertex_normals(&mut self) -> Option<DenseMap<VertexHandle, Vector3<f64>>> {
        self.vertex_normals.take()
    }

    pub(crate) fn put_back_vertex_normals(&mut self, m: DenseMap<VertexHandle, Vector3<f64>>) {
        self.vertex_normals = Some(m);
    }
}


// ===========================================================================
// ===== Mutation: `add_vertex` and `add_face`
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// Appends an isolated vertex with the given position. The handle of the
    /// new vertex has index `n_vertices()` before the call; indices are
    /// handed out strictly increasing.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexHandle {
        let vh = self.vertices.push(Vertex { outgoing: Opt::none() });
        let ph = self.positions.push(position);
        debug_assert_eq!(vh, ph);

        if let Some(normals) = &mut self.vertex_normals {
            let nh = normals.push(Vector3::zero());
            debug_assert_eq!(vh, nh);
        }

        vh
    }

    /// Adds a triangle. Available for all configurations.
    pub fn add_triangle(
        &mut self,
        [a, b, c]: [VertexHandle; 3],
    ) -> Result<FaceHandle, TopologyError> {
        self.add_face(&[a, b, c])
    }

    /// Adds a face over the given vertices, in winding order.
    ///
    /// For triangle meshes exactly three vertices are required, for polygon
    /// meshes at least three. The vertices have to be pairwise distinct,
    /// each of them must be isolated or on the boundary, and any half edge
    /// that already runs between two consecutive vertices must not belong to
    /// a face yet. If any of these checks fails, the error is returned and
    /// the mesh is left exactly as it was.
    pub fn add_face(&mut self, vertices: &[VertexHandle]) -> Result<FaceHandle, TopologyError> {
        if C::FaceKind::ONLY_TRIANGLES && vertices.len() != 3 {
            return Err(TopologyError::FaceValence { given: vertices.len() });
        }
        if vertices.len() < 3 {
            return Err(TopologyError::FaceValence { given: vertices.len() });
        }

        for &vh in vertices {
            self.check_vertex(vh)?;
        }

        // All handles are valid now, so we reflect that in the type. The
        // reinterpret cast is fine: `Checked<VertexHandle>` is a
        // `repr(transparent)` wrapper around `VertexHandle`.
        let vertices = unsafe {
            slice::from_raw_parts(
                vertices.as_ptr() as *const Checked<VertexHandle>,
                vertices.len(),
            )
        };

        self.validate_new_face(vertices)?;

        // From here on nothing can fail.
        Ok(self.link_new_face(vertices))
    }

    /// All error checks of `add_face` that need connectivity. Performs no
    /// mutation whatsoever.
    fn validate_new_face(
        &self,
        vertices: &[Checked<VertexHandle>],
    ) -> Result<(), TopologyError> {
        let n = vertices.len();

        for i in 0..n {
            for j in (i + 1)..n {
                if vertices[i] == vertices[j] {
                    return Err(TopologyError::DuplicateVertex(*vertices[i]));
                }
            }
        }

        // Each corner vertex has to be isolated or on the boundary. A
        // non-boundary vertex is already surrounded by a closed fan of
        // faces, so any face added to it would be a second fan.
        for &vh in vertices {
            if let Some(outgoing) = self[vh].outgoing.into_option() {
                if self[outgoing].face.is_some() {
                    return Err(TopologyError::NonManifoldVertex(*vh));
                }
            }
        }

        // A half edge that already runs between two consecutive vertices
        // must still be free (no face), otherwise the edge would end up
        // with more than two adjacent faces.
        for vi in 0..n {
            let from = vertices[vi];
            let to = vertices[(vi + 1) % n];
            if let Some(he) = self.he_between(from, to) {
                if self[he].face.is_some() {
                    return Err(TopologyError::NonManifoldEdge {
                        from: *from,
                        to: *to,
                    });
                }
            }
        }

        Ok(())
    }

    /// The mutating part of `add_face`. Expects `validate_new_face` to have
    /// passed; under that precondition this cannot fail.
    fn link_new_face(&mut self, vertices: &[Checked<VertexHandle>]) -> FaceHandle {
        let n = vertices.len();

        // Collect the inner half edges of the new face, creating the
        // missing ones. `inner[i]` runs from `vertices[i]` to
        // `vertices[(i + 1) % n]`. Its `next`/`prev` handles are dummies
        // for new edges and are all overwritten below.
        let mut inner: SmallVec<[Checked<HalfEdgeHandle>; 8]> = SmallVec::with_capacity(n);
        for vi in 0..n {
            let from = vertices[vi];
            let to = vertices[(vi + 1) % n];
            let he = match self.he_between(from, to) {
                Some(he) => he,
                None => unsafe { self.add_edge_partially(from, to) },
            };
            inner.push(he);
        }

        let new_face = self.faces.push(Face { edge: inner[0] });
        if let Some(normals) = &mut self.face_normals {
            let nh = normals.push(Vector3::zero());
            debug_assert_eq!(new_face, nh);
        }
        let new_face = unsafe { Checked::new(new_face) };

        for &he in &inner {
            self[he].face = Opt::some(new_face);
        }

        // Fix the cycle links around each corner vertex. With `incoming`
        // and `outgoing` being the two *outer* half edges at the corner,
        // four situations exist, depending on which of the two already
        // belonged to a face before this call.
        for vi in 0..n {
            let prev_idx = if vi == 0 { n - 1 } else { vi - 1 };

            let vh = vertices[vi];
            let incoming = inner[vi].twin();
            let outgoing = inner[prev_idx].twin();

            let incoming_face = self[incoming].face;
            let outgoing_face = self[outgoing].face;

            match (incoming_face.is_some(), outgoing_face.is_some()) {
                // Both edges of this corner are new.
                (false, false) => {
                    if let Some(start) = self[vh].outgoing.into_option() {
                        // The vertex already has other fan blades; splice
                        // the new blade into the boundary cycle. `start` is
                        // a boundary half edge (boundary-outgoing
                        // invariant), and its `prev` closes a boundary
                        // loop, so that one is a boundary half edge into
                        // `vh`.
                        let end = self[start].prev;
                        set_next_prev!(self, incoming -> start);
                        set_next_prev!(self, end -> outgoing);
                        // `outgoing` of `vh` is still `start`, still a
                        // boundary half edge: nothing to update.
                    } else {
                        // The vertex was isolated.
                        set_next_prev!(self, incoming -> outgoing);
                        self[vh].outgoing = Opt::some(outgoing);
                    }
                }

                // The incoming edge already bounds a face, the outgoing one
                // is new. The half edge whose `next` pointed at
                // `incoming.twin()` (a soon-to-be inner edge) has to point
                // at `outgoing` instead.
                (true, false) => {
                    let before_new = self[incoming.twin()].prev;
                    set_next_prev!(self, before_new -> outgoing);

                    // `incoming.twin()` may have been the stored outgoing
                    // half edge of `vh`, but it stops being boundary now.
                    // `outgoing` certainly is boundary.
                    self[vh].outgoing = Opt::some(outgoing);
                }

                // The outgoing edge already bounds a face, the incoming one
                // is new: hook the new blade after `outgoing.twin()`.
                (false, true) => {
                    let blade_start = self[outgoing.twin()].next;
                    set_next_prev!(self, incoming -> blade_start);

                    // The only half edge losing its boundary status is
                    // `outgoing.twin()`, which does not start at `vh`, so
                    // the stored outgoing handle stays valid.
                }

                // Both edges already bound faces: the new face connects two
                // existing fan blades. If the blade of `incoming` does not
                // directly follow the blade of `outgoing` in the cycle
                // around the vertex, it has to be moved there first.
                (true, true) => {
                    let ib_end = self.find_incoming_he(
                        incoming,
                        |inc| self[inc].face.is_none(),
                    );

                    if self[outgoing.twin()].next != incoming.twin() {
                        // Unsplice the blade starting at `incoming.twin()`
                        // from the cycle and re-insert it right after the
                        // blade of `outgoing`.
                        let ib_end = ib_end
                            .expect("inconsistent half edge connectivity: no blade end");
                        let bib_end = self[incoming.twin()].prev;

                        let after_ib = self[ib_end].next;
                        set_next_prev!(self, bib_end -> after_ib);

                        let aob_start = self[outgoing.twin()].next;
                        set_next_prev!(self, ib_end -> aob_start);

                        // The cycle is briefly broken here; setting the
                        // inner `next` handles below repairs it before
                        // anyone can observe it.
                        self[vh].outgoing = Opt::some(aob_start);
                    } else if let Some(ib_end) = ib_end {
                        // Order is already fine. The stored outgoing handle
                        // might lose its boundary status though, so point
                        // it at the start of the blade after `incoming`'s.
                        // If no boundary half edge is left, the vertex
                        // becomes interior and any outgoing handle is fine.
                        let new_outgoing = self[ib_end].next;
                        self[vh].outgoing = Opt::some(new_outgoing);
                    }
                }
            }
        }

        // Close the inner cycle of the new face.
        for i in 0..n {
            let curr = inner[i];
            let next = inner[(i + 1) % n];
            set_next_prev!(self, curr -> next);
        }

        *new_face
    }
}


// ===========================================================================
// ===== Element iterators
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// All vertex handles, in increasing index (= creation) order.
    pub fn vertices(&self) -> Handles<VertexHandle> {
        self.vertices.handles()
    }

    /// All face handles, in increasing index order.
    pub fn faces(&self) -> Handles<FaceHandle> {
        self.faces.handles()
    }

    /// All edge handles, in increasing index order.
    pub fn edges(&self) -> Handles<EdgeHandle> {
        Handles::up_to(self.n_edges())
    }

    /// All half edge handles, in increasing index order.
    pub fn halfedges(&self) -> Handles<HalfEdgeHandle> {
        self.half_edges.handles()
    }
}


// ===========================================================================
// ===== Integrity checking (used heavily by the test suite)
// ===========================================================================

impl<C: Config> HalfEdgeMesh<C> {
    /// Walks over the whole mesh and panics as soon as any connectivity
    /// invariant is violated. Intended for tests and debugging.
    pub fn check_integrity(&self) {
        // Vertices: `outgoing` handles are valid, their source is the
        // vertex, and the boundary-outgoing invariant holds.
        for vh in self.vertices.handles() {
            let v = &self.vertices[vh];
            if let Some(outgoing) = v.outgoing.into_option() {
                assert!(
                    self.half_edges.contains_handle(*outgoing),
                    "[{:?}].outgoing = {:?}, which does not exist",
                    vh, outgoing,
                );
                assert_eq!(
                    *self[outgoing.twin()].target, vh,
                    "[{:?}].outgoing = {:?} does not start at the vertex",
                    vh, outgoing,
                );
            }
        }

        // Faces: `edge` handles are valid and point back to the face.
        for fh in self.faces.handles() {
            let f = &self.faces[fh];
            assert!(
                self.half_edges.contains_handle(*f.edge),
                "[{:?}].edge = {:?}, which does not exist",
                fh, f.edge,
            );
            assert_eq!(
                self[f.edge].face.into_option().map(|f| *f), Some(fh),
                "[{:?}].edge = {:?}, whose face is {:?}",
                fh, f.edge, self[f.edge].face,
            );
        }

        // Half edges: all referenced handles valid, `prev` inverse to
        // `next`.
        for heh in self.half_edges.handles() {
            let he = &self.half_edges[heh];
            if let Some(face) = he.face.into_option() {
                assert!(
                    self.faces.contains_handle(*face),
                    "[{:?}].face = {:?}, which does not exist",
                    heh, face,
                );
            }
            assert!(self.vertices.contains_handle(*he.target));
            assert!(self.half_edges.contains_handle(*he.next));
            assert!(self.half_edges.contains_handle(*he.prev));
            assert_eq!(
                *self[he.prev].next, heh,
                "[[{:?}].prev].next != {:?}",
                heh, heh,
            );
        }

        // Every `next` cycle stays within one face (or hole) and closes.
        let total = self.half_edges.num_elements() as usize;
        let mut visited = vec![false; total];
        for start in self.half_edges.handles() {
            if visited[start.to_usize()] {
                continue;
            }

            let face = self.half_edges[start].face;
            let mut heh = start;
            let mut steps = 0;
            loop {
                assert_eq!(
                    self.half_edges[heh].face, face,
                    "face changes along the `next` cycle through {:?}",
                    start,
                );
                assert!(
                    !visited[heh.to_usize()],
                    "{:?} appears in two `next` cycles",
                    heh,
                );
                visited[heh.to_usize()] = true;

                heh = *self.half_edges[heh].next;
                steps += 1;
                assert!(steps <= total, "`next` cycle through {:?} does not close", start);

                if heh == start {
                    break;
                }
            }
        }
    }
}
