//! Conversion between [`TriMesh`] and a plain buffer representation.
//!
//! [`PlainMeshData`] is the interchange format of this library: flat,
//! index-based buffers without any connectivity, suitable for handing to
//! renderers, FFI boundaries or other thread contexts. The type contains
//! only owned `Vec`s and is `Send + Sync`; a conversion is always a full
//! copy, so the plain data and the mesh it came from are independent.

use cgmath::Point3;
use static_assertions::assert_impl_all;

use crate::{
    core::TriMesh,
    error::TopologyError,
    handle::{hsize, Handle, VertexHandle},
};


/// A triangle mesh as plain index buffers.
///
/// - `vertices` holds `vertex_count * 3` coordinates, laid out `x y z` per
///   vertex, in vertex index order.
/// - `faces` holds `face_count * 3` vertex indices, three consecutive
///   indices per triangle, in face index order.
///
/// The counts are redundant with the buffer lengths; constructors of this
/// type keep them consistent. [`from_plain`] treats inconsistent buffer
/// lengths as a programming error and panics; out-of-range indices inside a
/// well-shaped buffer are reported as [`TopologyError`]s instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainMeshData {
    pub vertex_count: usize,
    pub face_count: usize,
    pub vertices: Vec<f64>,
    pub faces: Vec<hsize>,
}

assert_impl_all!(PlainMeshData: Send, Sync);

/// Copies a triangle mesh into plain buffers.
///
/// Vertex `i` of the mesh occupies `vertices[3*i .. 3*i + 3]`, face `j`
/// occupies `faces[3*j .. 3*j + 3]` with its vertices in `fv` order. The
/// result shares no storage with the mesh.
pub fn to_plain(mesh: &TriMesh) -> PlainMeshData {
    let vertex_count = mesh.n_vertices() as usize;
    let face_count = mesh.n_faces() as usize;

    let mut vertices = Vec::with_capacity(vertex_count * 3);
    for p in mesh.points() {
        vertices.extend_from_slice(&[p.x, p.y, p.z]);
    }

    let mut faces = Vec::with_capacity(face_count * 3);
    for fh in mesh.faces() {
        // The face handle comes from the mesh itself, `fv` cannot fail.
        let fv = mesh.fv(fh).unwrap_or_else(|_| unreachable!());
        faces.extend(fv.map(|vh| vh.idx()));
    }

    PlainMeshData { vertex_count, face_count, vertices, faces }
}

/// Builds a triangle mesh from plain buffers.
///
/// Vertices and faces are added in buffer order, so the handle indices of
/// the result equal the buffer indices. Out-of-range vertex indices and
/// triangles that violate the manifold rules are reported as
/// [`TopologyError`]s.
///
/// # Panics
///
/// Panics if `vertices.len() != vertex_count * 3` or
/// `faces.len() != face_count * 3`.
pub fn from_plain(data: &PlainMeshData) -> Result<TriMesh, TopologyError> {
    assert_eq!(
        data.vertices.len(),
        data.vertex_count * 3,
        "vertex buffer length does not match vertex_count",
    );
    assert_eq!(
        data.faces.len(),
        data.face_count * 3,
        "face buffer length does not match face_count",
    );

    let mut mesh = TriMesh::new();
    for coords in data.vertices.chunks_exact(3) {
        mesh.add_vertex(Point3::new(coords[0], coords[1], coords[2]));
    }

    for tri in data.faces.chunks_exact(3) {
        mesh.add_triangle([
            VertexHandle::new(tri[0]),
            VertexHandle::new(tri[1]),
            VertexHandle::new(tri[2]),
        ])?;
    }

    Ok(mesh)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ElementKind, TopologyError};

    fn two_triangles() -> TriMesh {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]).unwrap();
        mesh.add_face(&[b, d, c]).unwrap();
        mesh
    }

    #[test]
    fn to_plain_layout() {
        let mesh = two_triangles();
        let plain = to_plain(&mesh);

        assert_eq!(plain.vertex_count, 4);
        assert_eq!(plain.face_count, 2);
        assert_eq!(plain.vertices.len(), 12);
        assert_eq!(
            plain.vertices[..6],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        );
        assert_eq!(plain.faces, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn to_plain_of_empty_mesh() {
        let plain = to_plain(&TriMesh::new());
        assert_eq!(plain, PlainMeshData::default());
    }

    #[test]
    fn round_trip_preserves_everything() {
        let plain = to_plain(&two_triangles());
        let back = from_plain(&plain).unwrap();
        back.check_integrity();

        // f64 values are copied verbatim, so the second conversion is
        // bit-identical to the first.
        assert_eq!(to_plain(&back), plain);
    }

    #[test]
    fn from_plain_rejects_out_of_range_index() {
        let plain = PlainMeshData {
            vertex_count: 3,
            face_count: 1,
            vertices: vec![0.0; 9],
            faces: vec![0, 1, 7],
        };

        match from_plain(&plain) {
            Err(TopologyError::InvalidHandle(e)) => {
                assert_eq!(e.kind, ElementKind::Vertex);
                assert_eq!(e.idx, 7);
            }
            other => panic!("expected InvalidHandle error, got {:?}", other),
        }
    }

    #[test]
    fn from_plain_rejects_non_manifold_input() {
        // Three triangles sharing the edge (0, 1).
        let plain = PlainMeshData {
            vertex_count: 5,
            face_count: 3,
            vertices: vec![0.0; 15],
            faces: vec![0, 1, 2, 1, 0, 3, 0, 1, 4],
        };

        assert!(matches!(
            from_plain(&plain),
            Err(TopologyError::NonManifoldEdge { .. }),
        ));
    }

    #[test]
    #[should_panic(expected = "vertex buffer length")]
    fn from_plain_panics_on_malformed_vertex_buffer() {
        let plain = PlainMeshData {
            vertex_count: 2,
            face_count: 0,
            vertices: vec![0.0; 5],
            faces: vec![],
        };
        let _ = from_plain(&plain);
    }

    #[test]
    fn plain_data_is_independent_of_the_mesh() {
        let mut mesh = two_triangles();
        let plain = to_plain(&mesh);

        mesh.points_mut()[0] = Point3::new(9.0, 9.0, 9.0);
        assert_eq!(plain.vertices[0], 0.0);
    }
}
