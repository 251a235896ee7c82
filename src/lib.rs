//! A half-edge polygon mesh: connectivity, geometry, normals and simple
//! I/O.
//!
//! The central type is [`HalfEdgeMesh`] (usually used through its aliases
//! [`TriMesh`] and [`PolyMesh`]). It stores the full connectivity of a
//! manifold polygon mesh as half edges, owns the vertex positions, and can
//! maintain per-vertex and per-face normals on request. Elements are
//! referred to by small typed handles ([`VertexHandle`], [`FaceHandle`],
//! ...) which are plain indices under the hood.
//!
//! Meshes are built by appending: [`add_vertex`][HalfEdgeMesh::add_vertex]
//! and [`add_face`][HalfEdgeMesh::add_face]. Elements are never removed, so
//! handles stay valid and indices are densely packed for the lifetime of
//! the mesh. `add_face` rejects anything that would break the manifold
//! structure and leaves the mesh untouched in that case.
//!
//! ```
//! use hemesh::TriMesh;
//! use cgmath::Point3;
//!
//! # fn main() -> Result<(), hemesh::TopologyError> {
//! let mut mesh = TriMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! let f = mesh.add_face(&[a, b, c])?;
//!
//! assert_eq!(mesh.n_faces(), 1);
//! assert_eq!(mesh.fv(f).unwrap().collect::<Vec<_>>(), vec![a, b, c]);
//!
//! mesh.request_vertex_normals();
//! mesh.update_normals();
//! assert_eq!(mesh.vertex_normals().unwrap().len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! Neighborhood queries are answered by the circulators
//! [`vv`][HalfEdgeMesh::vv], [`vf`][HalfEdgeMesh::vf] and
//! [`fv`][HalfEdgeMesh::fv]. For data exchange with renderers or other
//! processes, [`to_plain`] and [`from_plain`] convert to and from flat
//! index buffers, and [`io`] reads and writes an OBJ-style text format.
//!
//! All geometry uses `f64`, with the vector types of [`cgmath`].

#![deny(missing_debug_implementations)]

pub mod core;
pub mod error;
pub mod handle;
pub mod io;
pub mod map;
pub mod plain;
pub mod prelude;

pub use crate::{
    core::{Config, FaceKind, HalfEdgeMesh, PolyConfig, PolyMesh, TriConfig, TriMesh},
    error::{ElementKind, InvalidHandleError, TopologyError},
    handle::{hsize, EdgeHandle, FaceHandle, HalfEdgeHandle, Handle, VertexHandle},
    plain::{from_plain, to_plain, PlainMeshData},
};
