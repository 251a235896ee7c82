//! An OBJ-style line format for triangle and polygon meshes.
//!
//! Only geometry is handled:
//!
//! - `v x y z` adds a vertex (coordinates as decimal floats).
//! - `f i j k ...` adds a face from 1-based vertex indices. Negative
//!   indices count back from the most recently added vertex (`-1` is the
//!   last one). The `i/t/n` corner syntax is accepted, everything after the
//!   first slash is ignored.
//! - `#` starts a comment reaching to the end of the line.
//! - All other keywords (`vn`, `vt`, `o`, `g`, `s`, `usemtl`, ...) are
//!   skipped entirely.
//!
//! The reader produces a [`TriMesh`]: faces with more than three corners
//! are triangulated as a fan around their first corner. Coordinates are
//! written with the shortest representation that parses back to the same
//! `f64`, so a write/read cycle reproduces positions exactly.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use smallvec::SmallVec;

use crate::{
    core::{Config, HalfEdgeMesh, TriMesh},
    handle::{hsize, Handle, VertexHandle},
};
use super::{Error, ParseError};


/// Writes the mesh to the file at `path`, creating or truncating it.
pub fn write_mesh<C: Config>(mesh: &HalfEdgeMesh<C>, path: impl AsRef<Path>) -> Result<(), Error> {
    let file = File::create(path)?;
    write_mesh_to(mesh, BufWriter::new(file))
}

/// Writes the mesh to the given writer.
///
/// Vertices come first (in index order), then one `f` line per face with
/// the vertices in `fv` order. Faces of any valence are written as is;
/// reading the result back as a [`TriMesh`] triangulates them.
pub fn write_mesh_to<C: Config>(mesh: &HalfEdgeMesh<C>, mut w: impl Write) -> Result<(), Error> {
    for p in mesh.points() {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }

    for fh in mesh.faces() {
        write!(w, "f")?;
        // The handle comes from the mesh itself, `fv` cannot fail.
        let fv = mesh.fv(fh).unwrap_or_else(|_| unreachable!());
        for vh in fv {
            write!(w, " {}", vh.idx() + 1)?;
        }
        writeln!(w)?;
    }

    w.flush()?;
    Ok(())
}

/// Reads a triangle mesh from the file at `path`.
pub fn read_trimesh(path: impl AsRef<Path>) -> Result<TriMesh, Error> {
    let file = File::open(path)?;
    read_trimesh_from(BufReader::new(file))
}

/// Reads a triangle mesh from the given reader.
///
/// Vertex indices in `f` lines are resolved against the vertices read so
/// far; indices out of that range (including `0`, which OBJ does not use)
/// are parse errors. Structural problems like non-manifold faces are
/// reported as [`Error::Topology`].
pub fn read_trimesh_from(read: impl Read) -> Result<TriMesh, Error> {
    let mut mesh = TriMesh::new();

    for (i, line) in BufReader::new(read).lines().enumerate() {
        let line_no = i as u64 + 1;
        let line = line?;

        let data = match line.find('#') {
            Some(pos) => &line[..pos],
            None => &line[..],
        };
        let mut tokens = data.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coord = |name| -> Result<f64, ParseError> {
                    let token = tokens.next().ok_or_else(|| {
                        ParseError::new(line_no, format!("missing {} coordinate", name))
                    })?;
                    token.parse().map_err(|_| {
                        ParseError::new(line_no, format!("invalid {} coordinate '{}'", name, token))
                    })
                };

                let [x, y, z] = [coord("x")?, coord("y")?, coord("z")?];
                mesh.add_vertex(cgmath::Point3::new(x, y, z));
            }

            Some("f") => {
                let mut corners = SmallVec::<[VertexHandle; 4]>::new();
                for token in tokens {
                    corners.push(parse_corner(token, mesh.n_vertices(), line_no)?);
                }

                if corners.len() < 3 {
                    return Err(ParseError::new(
                        line_no,
                        format!("face with only {} vertices", corners.len()),
                    ).into());
                }

                // Fan triangulation around the first corner.
                for i in 1..corners.len() - 1 {
                    mesh.add_face(&[corners[0], corners[i], corners[i + 1]])?;
                }
            }

            // Blank lines, comments and all other keywords.
            _ => {}
        }
    }

    Ok(mesh)
}

/// Parses one corner of an `f` line (`7`, `-2` or `7/1/3`) into a handle
/// for one of the `n_vertices` vertices read so far.
fn parse_corner(
    token: &str,
    n_vertices: hsize,
    line_no: u64,
) -> Result<VertexHandle, ParseError> {
    // Texture and normal references after the first `/` are ignored.
    let index_str = token.splitn(2, '/').next().unwrap_or("");
    let index: i64 = index_str.parse().map_err(|_| {
        ParseError::new(line_no, format!("invalid vertex index '{}'", token))
    })?;

    let resolved = if index < 0 {
        i64::from(n_vertices) + index
    } else {
        index - 1
    };

    if resolved < 0 || resolved >= i64::from(n_vertices) {
        return Err(ParseError::new(
            line_no,
            format!("vertex index {} out of range (of {} vertices)", index, n_vertices),
        ));
    }

    Ok(VertexHandle::new(resolved as hsize))
}
