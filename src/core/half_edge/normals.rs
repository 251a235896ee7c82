//! Normal estimation for faces and vertices.
//!
//! Face normals come from the cross product of the first two edge vectors
//! of the face; vertex normals are the normalized average of the adjacent
//! face normals. Degenerate faces (zero area, collapsed edges) get the zero
//! vector and do not disturb the vertex normals around them.

use cgmath::{Vector3, prelude::*};

use crate::error::InvalidHandleError;
use crate::handle::{FaceHandle, Handle};
use super::{Checked, Config, HalfEdgeMesh};


/// Normalizes `v`, mapping vectors too short to normalize to zero instead
/// of producing NaNs.
fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let len = v.magnitude();
    if len > 0.0 {
        v / len
    } else {
        Vector3::zero()
    }
}

impl<C: Config> HalfEdgeMesh<C> {
    /// Computes the unit normal of one face from its first three vertices.
    ///
    /// With the face's vertices `v0, v1, v2, ...` in winding order, the
    /// normal is `normalize((v1 - v0) x (v2 - v0))`. Counter-clockwise
    /// winding (seen from outside) gives an outward normal. Degenerate
    /// faces yield the zero vector.
    pub fn calc_face_normal(&self, fh: FaceHandle) -> Result<Vector3<f64>, InvalidHandleError> {
        let fh = self.check_face(fh)?;
        Ok(self.face_normal_of(fh))
    }

    pub(crate) fn face_normal_of(&self, fh: Checked<FaceHandle>) -> Vector3<f64> {
        let he0 = self[fh].edge;
        let he1 = self[he0].next;

        let v0 = self[he0.twin()].target;
        let v1 = self[he0].target;
        let v2 = self[he1].target;

        let [p0, p1, p2] = [
            self.points()[v0.to_usize()],
            self.points()[v1.to_usize()],
            self.points()[v2.to_usize()],
        ];

        normalize_or_zero((p1 - p0).cross(p2 - p0))
    }

    /// Recomputes all face normals from the current vertex positions. Does
    /// nothing if face normals were never requested.
    pub fn update_face_normals(&mut self) {
        let mut normals = match self.take_face_normals() {
            Some(normals) => normals,
            None => return,
        };

        for fh in self.faces() {
            let checked = unsafe { Checked::new(fh) };
            normals[fh] = self.face_normal_of(checked);
        }

        self.put_back_face_normals(normals);
    }

    /// Recomputes all vertex normals from the current vertex positions.
    /// Does nothing if vertex normals were never requested.
    ///
    /// Each vertex normal is the normalized sum of the normals of its
    /// adjacent faces, all weighted equally. If face normals are stored,
    /// they are used as is (call [`update_face_normals`]
    /// [Self::update_face_normals] first, or [`update_normals`]
    /// [Self::update_normals] which orders the two correctly); otherwise
    /// face normals are computed on the fly without being stored. A vertex
    /// with no faces, or only degenerate ones, gets the zero vector.
    pub fn update_vertex_normals(&mut self) {
        let mut normals = match self.take_vertex_normals() {
            Some(normals) => normals,
            None => return,
        };

        for vh in self.vertices() {
            let checked = unsafe { Checked::new(vh) };

            let mut acc = Vector3::zero();
            for outgoing in self.circulate_around_vertex(checked) {
                if let Some(fh) = self[outgoing].face.into_option() {
                    let n = match self.face_normals_map() {
                        Some(stored) => stored[*fh],
                        None => self.face_normal_of(fh),
                    };
                    acc += n;
                }
            }

            // Normalizing the sum equals normalizing the unweighted
            // average. Degenerate faces contributed zero and drop out.
            normals[vh] = normalize_or_zero(acc);
        }

        self.put_back_vertex_normals(normals);
    }

    /// Recomputes all requested normals: face normals first, then vertex
    /// normals (which consume the fresh face normals when present).
    pub fn update_normals(&mut self) {
        self.update_face_normals();
        self.update_vertex_normals();
    }
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Point3, Vector3};

    use crate::core::{TriMesh, PolyMesh};
    use crate::handle::Handle;

    #[test]
    fn face_normal_of_ccw_triangle_points_up() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let f = mesh.add_face(&[a, b, c]).unwrap();

        let n = mesh.calc_face_normal(f).unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn update_face_normals_fills_storage() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 2.0, 0.0));
        mesh.add_face(&[a, b, c]).unwrap();

        assert!(!mesh.has_face_normals());
        assert_eq!(mesh.face_normals(), None);

        mesh.request_face_normals();
        mesh.request_face_normals(); // idempotent
        assert!(mesh.has_face_normals());

        mesh.update_normals();
        let normals = mesh.face_normals().unwrap();
        assert_eq!(normals.len(), 1);
        assert_relative_eq!(normals[0], Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn vertex_normals_average_adjacent_faces() {
        // Two triangles in the xy-plane sharing the edge (b, c). All
        // normals point up.
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]).unwrap();
        mesh.add_face(&[b, d, c]).unwrap();

        mesh.request_vertex_normals();
        mesh.update_normals();

        for &n in mesh.vertex_normals().unwrap() {
            assert_relative_eq!(n, Vector3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn vertex_normals_without_stored_face_normals() {
        // A right-angle "roof": two faces folded along the x axis, one
        // facing +z, one facing +y. The shared vertices average the two.
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0));
        mesh.add_face(&[a, b, c]).unwrap();
        mesh.add_face(&[b, a, d]).unwrap();

        mesh.request_vertex_normals();
        assert!(!mesh.has_face_normals());
        mesh.update_normals();

        let normals = mesh.vertex_normals().unwrap();
        let diag = Vector3::new(0.0, 1.0, 1.0) / f64::sqrt(2.0);
        assert_relative_eq!(normals[a.to_usize()], diag, epsilon = 1e-12);
        assert_relative_eq!(normals[b.to_usize()], diag, epsilon = 1e-12);
        assert_relative_eq!(normals[c.to_usize()], Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(normals[d.to_usize()], Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn degenerate_face_gets_zero_normal_and_is_ignored() {
        let mut mesh = PolyMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0)); // collinear
        let f = mesh.add_face(&[a, b, c]).unwrap();

        assert_relative_eq!(mesh.calc_face_normal(f).unwrap(), Vector3::new(0.0, 0.0, 0.0));

        mesh.request_vertex_normals();
        mesh.update_normals();
        for &n in mesh.vertex_normals().unwrap() {
            assert_relative_eq!(n, Vector3::new(0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn normals_follow_position_edits() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]).unwrap();

        mesh.request_face_normals();
        mesh.update_normals();
        assert_relative_eq!(mesh.face_normals().unwrap()[0], Vector3::new(0.0, 0.0, 1.0));

        // Swap two vertices by editing positions in place: the winding
        // flips, so the recomputed normal must flip too.
        let points = mesh.points_mut();
        points.swap(0, 1);
        mesh.update_normals();
        assert_relative_eq!(mesh.face_normals().unwrap()[0], Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn vertex_normals_grow_with_new_vertices() {
        let mut mesh = TriMesh::new();
        mesh.request_vertex_normals();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]).unwrap();

        assert_eq!(mesh.vertex_normals().unwrap().len(), 3);
    }
}
