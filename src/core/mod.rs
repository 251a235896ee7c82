//! The half-edge mesh data structure: connectivity, geometry and normals.
//!
//! The central type is [`HalfEdgeMesh`], a polygon mesh that stores its
//! connectivity as half edges and owns the vertex positions and (optional)
//! normal storage. The mesh is configured at compile time via the [`Config`]
//! trait: [`TriConfig`] restricts faces to triangles, [`PolyConfig`] allows
//! arbitrary polygons. The aliases [`TriMesh`] and [`PolyMesh`] name the two
//! configurations.
//!
//! # Half edges
//!
//! Every edge is represented by two directed *half edges*, one per
//! direction. Each half edge knows the vertex it points to, the face it
//! belongs to (none for boundary half edges), and the next and previous half
//! edges in the cycle around that face. The two halves of an edge are stored
//! next to each other, so finding the opposite half edge is a single index
//! operation, and the edge index is simply the half edge index divided by
//! two.
//!
//! This representation answers all neighborhood queries needed here: the
//! vertices of a face (walk `next`), the one-ring of a vertex (alternate
//! `opposite` and `next`) and the faces around a vertex (same walk, skipping
//! boundary gaps).

mod checked;
pub(crate) mod half_edge;

pub use self::half_edge::{HalfEdgeMesh, TriMesh, PolyMesh};
pub use self::half_edge::adj::{FvIter, VfIter, VvIter};

pub(crate) use self::checked::Checked;


mod sealed {
    pub trait Sealed {}
}

/// The kinds of faces a mesh can store: [`TriFaces`] or [`PolyFaces`].
///
/// This trait is sealed; exactly the two types in this module implement it.
pub trait FaceKind: sealed::Sealed + 'static {
    const ONLY_TRIANGLES: bool;
}

/// Only triangular faces are allowed.
#[allow(missing_debug_implementations)]
pub enum TriFaces {}
impl sealed::Sealed for TriFaces {}
impl FaceKind for TriFaces {
    const ONLY_TRIANGLES: bool = true;
}

/// Faces may be arbitrary polygons with at least three vertices.
#[allow(missing_debug_implementations)]
pub enum PolyFaces {}
impl sealed::Sealed for PolyFaces {}
impl FaceKind for PolyFaces {
    const ONLY_TRIANGLES: bool = false;
}

/// Compile-time configuration of [`HalfEdgeMesh`].
///
/// To pick a configuration, use [`TriConfig`] or [`PolyConfig`] (or define
/// your own uninhabited type implementing this trait).
pub trait Config: 'static {
    /// The kind of faces the mesh accepts. Restricting a mesh to triangles
    /// makes the per-face valence rule (`exactly 3`) a hard error instead of
    /// a convention.
    type FaceKind: FaceKind;
}

/// Configuration for triangle meshes.
#[allow(missing_debug_implementations)]
pub enum TriConfig {}
impl Config for TriConfig {
    type FaceKind = TriFaces;
}

/// Configuration for general polygon meshes.
#[allow(missing_debug_implementations)]
pub enum PolyConfig {}
impl Config for PolyConfig {
    type FaceKind = PolyFaces;
}
