//! End-to-end tests: build a mesh, push it through the plain-buffer and
//! OBJ representations, and check that everything survives.

use std::io::Cursor;

use cgmath::Point3;

use hemesh::{
    from_plain, to_plain,
    io::{read_trimesh_from, write_mesh_to},
    prelude::*,
    PlainMeshData, TriMesh,
};


/// An octahedron: closed, every vertex interior with valence 4.
fn octahedron() -> TriMesh {
    let mut mesh = TriMesh::new();
    let px = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let nx = mesh.add_vertex(Point3::new(-1.0, 0.0, 0.0));
    let py = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let ny = mesh.add_vertex(Point3::new(0.0, -1.0, 0.0));
    let pz = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
    let nz = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0));

    for &[a, b, c] in &[
        [px, py, pz], [py, nx, pz], [nx, ny, pz], [ny, px, pz],
        [py, px, nz], [nx, py, nz], [ny, nx, nz], [px, ny, nz],
    ] {
        mesh.add_face(&[a, b, c]).unwrap();
    }
    mesh
}

#[test]
fn octahedron_is_well_formed() {
    let mesh = octahedron();
    mesh.check_integrity();

    assert_eq!(mesh.n_vertices(), 6);
    assert_eq!(mesh.n_faces(), 8);
    assert_eq!(mesh.n_edges(), 12);

    for vh in mesh.vertices() {
        assert!(!mesh.is_boundary_vertex(vh).unwrap());
        assert_eq!(mesh.vertex_valence(vh).unwrap(), 4);
        assert_eq!(mesh.vf(vh).unwrap().count(), 4);
    }
}

#[test]
fn plain_round_trip() {
    let mesh = octahedron();
    let plain = to_plain(&mesh);

    assert_eq!(plain.vertex_count, 6);
    assert_eq!(plain.face_count, 8);
    assert_eq!(plain.vertices.len(), 18);
    assert_eq!(plain.faces.len(), 24);

    let back = from_plain(&plain).unwrap();
    back.check_integrity();

    assert_eq!(back.n_vertices(), mesh.n_vertices());
    assert_eq!(back.n_faces(), mesh.n_faces());
    assert_eq!(back.points(), mesh.points());
    for fh in mesh.faces() {
        assert_eq!(
            back.fv(fh).unwrap().collect::<Vec<_>>(),
            mesh.fv(fh).unwrap().collect::<Vec<_>>(),
        );
    }

    // A second conversion produces bit-identical buffers.
    assert_eq!(to_plain(&back), plain);
}

#[test]
fn obj_round_trip() {
    let mesh = octahedron();

    let mut text = Vec::new();
    write_mesh_to(&mesh, &mut text).unwrap();
    let back = read_trimesh_from(Cursor::new(&text[..])).unwrap();
    back.check_integrity();

    assert_eq!(back.n_vertices(), mesh.n_vertices());
    assert_eq!(back.n_faces(), mesh.n_faces());
    assert_eq!(back.points(), mesh.points());
    for fh in mesh.faces() {
        assert_eq!(
            back.fv(fh).unwrap().collect::<Vec<_>>(),
            mesh.fv(fh).unwrap().collect::<Vec<_>>(),
        );
    }
}

#[test]
fn plain_and_obj_agree() {
    let input = "\
        v 0 0 0\n\
        v 1 0 0\n\
        v 1 1 0\n\
        v 0 1 0\n\
        f 1 2 3 4\n\
    ";
    let mesh = read_trimesh_from(Cursor::new(input)).unwrap();
    let plain = to_plain(&mesh);

    // The quad was fan-triangulated while reading.
    assert_eq!(plain, PlainMeshData {
        vertex_count: 4,
        face_count: 2,
        vertices: vec![
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            1.0, 1.0, 0.0,
            0.0, 1.0, 0.0,
        ],
        faces: vec![0, 1, 2, 0, 2, 3],
    });
}

#[test]
fn normals_survive_plain_rebuild() {
    let mut mesh = octahedron();
    mesh.request_vertex_normals();
    mesh.request_face_normals();
    mesh.update_normals();

    // Every vertex normal of a centered octahedron points away from the
    // origin, along the vertex position.
    let normals = mesh.vertex_normals().unwrap();
    for (vh, n) in mesh.vertices().zip(normals) {
        let p = mesh.points()[vh.to_usize()];
        let dot = n.x * p.x + n.y * p.y + n.z * p.z;
        assert!(dot > 0.99, "normal {:?} does not point along {:?}", n, p);
    }

    // Plain data carries no normals; the rebuilt mesh computes the same
    // ones from the same positions.
    let back = from_plain(&to_plain(&mesh)).unwrap();
    assert!(!back.has_vertex_normals());

    let mut back = back;
    back.request_vertex_normals();
    back.request_face_normals();
    back.update_normals();

    assert_eq!(back.vertex_normals().unwrap(), mesh.vertex_normals().unwrap());
    assert_eq!(back.face_normals().unwrap(), mesh.face_normals().unwrap());
}
