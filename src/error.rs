//! Error types reported by mesh operations.
//!
//! Topological failures never leave the mesh in a half-modified state: an
//! `add_face` call that returns an error has not changed the mesh at all.
//! I/O and parsing errors live in [`crate::io`].

use std::fmt;

use failure::Fail;

use crate::handle::{hsize, VertexHandle};


/// The kind of mesh element a handle refers to. Used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Vertex,
    Edge,
    HalfEdge,
    Face,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::HalfEdge => "half edge",
            ElementKind::Face => "face",
        }.fmt(f)
    }
}

/// An operation was given a handle that does not refer to an existing
/// element of the mesh it was passed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
#[fail(display = "{} handle with index {} does not refer to an existing element", kind, idx)]
pub struct InvalidHandleError {
    pub kind: ElementKind,
    pub idx: hsize,
}

impl InvalidHandleError {
    pub(crate) fn new(kind: ElementKind, idx: hsize) -> Self {
        Self { kind, idx }
    }
}

/// Adding a face would violate the structural rules of the mesh.
///
/// All variants are detected before the mesh is modified, so a failed
/// `add_face` leaves the mesh exactly as it was.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum TopologyError {
    /// One of the given vertex handles is invalid.
    #[fail(display = "{}", _0)]
    InvalidHandle(#[fail(cause)] InvalidHandleError),

    /// The same vertex appears more than once in the new face.
    #[fail(display = "vertex {:?} appears more than once in the new face", _0)]
    DuplicateVertex(VertexHandle),

    /// The number of vertices is not allowed by this mesh: triangle meshes
    /// require exactly three, polygon meshes at least three.
    #[fail(display = "a face with {} vertices is not allowed by this mesh", given)]
    FaceValence { given: usize },

    /// The edge between the two vertices already has a face on both sides.
    #[fail(
        display = "new face would create a non-manifold edge from {:?} to {:?} \
            (the half edge between them is already adjacent to a face)",
        from, to,
    )]
    NonManifoldEdge { from: VertexHandle, to: VertexHandle },

    /// The vertex is already surrounded by a closed fan of faces; adding
    /// another face touching it would create a non-manifold vertex.
    #[fail(display = "new face would create a non-manifold vertex at {:?}", _0)]
    NonManifoldVertex(VertexHandle),
}

impl From<InvalidHandleError> for TopologyError {
    fn from(src: InvalidHandleError) -> Self {
        TopologyError::InvalidHandle(src)
    }
}
