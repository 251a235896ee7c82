//! Typed handles that refer to mesh elements.
//!
//! All elements of a mesh (vertices, faces, edges and half edges) are stored
//! in dense arrays and referred to by their index in that array. A handle is
//! just such an index, wrapped in a new type so that the different element
//! kinds cannot be mixed up. Handles are `Copy`, compare by index and are
//! cheap to pass around.
//!
//! Handles stay valid as long as the mesh exists: element storage is
//! append-only, so an index handed out once always refers to the same
//! element.

use std::fmt;
use std::hash::Hash;


/// The integer type used as the underlying index of all handles.
#[allow(non_camel_case_types)]
pub type hsize = u32;

/// Types that can be used to refer to some element of a mesh.
pub trait Handle: 'static + Copy + fmt::Debug + Eq + Hash {
    /// Creates a handle from the given index.
    fn new(idx: hsize) -> Self;

    /// Returns the index of this handle.
    fn idx(&self) -> hsize;

    /// Creates a handle from the given `usize`. Panics if the value does not
    /// fit into `hsize`.
    #[inline(always)]
    fn from_usize(raw: usize) -> Self {
        assert!(
            raw <= hsize::max_value() as usize,
            "handle index {} is too large for the handle type",
            raw,
        );
        Self::new(raw as hsize)
    }

    /// Returns the index of this handle as `usize`.
    #[inline(always)]
    fn to_usize(&self) -> usize {
        self.idx() as usize
    }
}

macro_rules! make_handle_type {
    ($(#[$attr:meta])* $name:ident = $short:expr;) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(hsize);

        impl Handle for $name {
            #[inline(always)]
            fn new(idx: hsize) -> Self {
                $name(idx)
            }

            #[inline(always)]
            fn idx(&self) -> hsize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!($short, "{}"), self.0)
            }
        }
    }
}

make_handle_type!(
    /// A handle referring to a vertex.
    VertexHandle = "V";
);
make_handle_type!(
    /// A handle referring to a face.
    FaceHandle = "F";
);
make_handle_type!(
    /// A handle referring to a full edge (a pair of opposite half edges).
    EdgeHandle = "E";
);
make_handle_type!(
    /// A handle referring to a half edge (one directed side of an edge).
    HalfEdgeHandle = "HE";
);

impl HalfEdgeHandle {
    /// Returns the half edge of the given edge with the lower index.
    ///
    /// The two halves of an edge are always stored next to each other, with
    /// the first pair starting at index 0. Thus the half edges of edge `k`
    /// have the indices `2k` and `2k + 1`. This method does not check whether
    /// the half edge actually exists.
    #[inline(always)]
    pub fn lower_half_of(edge: EdgeHandle) -> Self {
        Self(edge.idx() * 2)
    }

    /// Returns the full edge this half edge belongs to (integer division of
    /// the index by two).
    #[inline(always)]
    pub fn full_edge(self) -> EdgeHandle {
        EdgeHandle::new(self.0 / 2)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_index_round_trip() {
        let vh = VertexHandle::new(7);
        assert_eq!(vh.idx(), 7);
        assert_eq!(vh.to_usize(), 7);
        assert_eq!(VertexHandle::from_usize(7), vh);
    }

    #[test]
    fn edge_half_edge_mapping() {
        let eh = EdgeHandle::new(3);
        let heh = HalfEdgeHandle::lower_half_of(eh);
        assert_eq!(heh.idx(), 6);
        assert_eq!(heh.full_edge(), eh);
        assert_eq!(HalfEdgeHandle::new(7).full_edge(), eh);
    }

    #[test]
    fn debug_repr() {
        assert_eq!(format!("{:?}", VertexHandle::new(0)), "V0");
        assert_eq!(format!("{:?}", FaceHandle::new(12)), "F12");
        assert_eq!(format!("{:?}", EdgeHandle::new(3)), "E3");
        assert_eq!(format!("{:?}", HalfEdgeHandle::new(5)), "HE5");
    }
}
