//! Neighborhood iterators: the one-ring circulators `vv`, `vf` and `fv`.
//!
//! All circulators are plain `Iterator`s that borrow the mesh immutably.
//! They walk in clockwise order around the center element and yield each
//! neighbor exactly once; iteration order starts at an unspecified neighbor
//! (except for `fv`, which starts at the first vertex the face was created
//! with).

use crate::{
    error::InvalidHandleError,
    handle::{VertexHandle, FaceHandle, HalfEdgeHandle},
};
use super::{Checked, Config, HalfEdgeMesh};


/// Iterator over all outgoing half edges of one vertex, in clockwise order.
///
/// The step from one outgoing half edge to the next is
/// `outgoing.twin().next`: hop to the incoming half edge of the same edge,
/// then advance along its cycle, which leaves the vertex again.
#[derive(Debug, Clone)]
pub(crate) enum CwVertexCirculator<'a, C: Config> {
    Empty,
    NonEmpty {
        mesh: &'a HalfEdgeMesh<C>,
        current_he: Checked<HalfEdgeHandle>,
        start_he: Checked<HalfEdgeHandle>,
    },
}

impl<'a, C: Config> CwVertexCirculator<'a, C> {
    pub(crate) fn new(mesh: &'a HalfEdgeMesh<C>, vh: Checked<VertexHandle>) -> Self {
        match mesh[vh].outgoing.into_option() {
            None => CwVertexCirculator::Empty,
            Some(start_he) => CwVertexCirculator::NonEmpty {
                mesh,
                current_he: start_he,
                start_he,
            },
        }
    }
}

impl<C: Config> Iterator for CwVertexCirculator<'_, C> {
    type Item = Checked<HalfEdgeHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CwVertexCirculator::Empty => None,
            CwVertexCirculator::NonEmpty { mesh, current_he, start_he } => {
                let out = *current_he;

                let next = mesh[out.twin()].next;
                if next == *start_he {
                    *self = CwVertexCirculator::Empty;
                } else {
                    *current_he = next;
                }

                Some(out)
            }
        }
    }
}

/// Iterator over the inner half edges of one face, in cycle order starting
/// at the face's stored half edge.
#[derive(Debug, Clone)]
pub(crate) enum FaceCirculator<'a, C: Config> {
    Done,
    NonEmpty {
        mesh: &'a HalfEdgeMesh<C>,
        current_he: Checked<HalfEdgeHandle>,
        start_he: Checked<HalfEdgeHandle>,
    },
}

impl<'a, C: Config> FaceCirculator<'a, C> {
    pub(crate) fn new(mesh: &'a HalfEdgeMesh<C>, fh: Checked<FaceHandle>) -> Self {
        let start_he = mesh[fh].edge;
        FaceCirculator::NonEmpty {
            mesh,
            current_he: start_he,
            start_he,
        }
    }
}

impl<C: Config> Iterator for FaceCirculator<'_, C> {
    type Item = Checked<HalfEdgeHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FaceCirculator::Done => None,
            FaceCirculator::NonEmpty { mesh, current_he, start_he } => {
                let out = *current_he;

                let next = mesh[out].next;
                if next == *start_he {
                    *self = FaceCirculator::Done;
                } else {
                    *current_he = next;
                }

                Some(out)
            }
        }
    }
}


/// Iterator over the neighbor vertices of one vertex (the one-ring).
/// Created by [`HalfEdgeMesh::vv`].
#[derive(Debug, Clone)]
pub struct VvIter<'a, C: Config> {
    it: CwVertexCirculator<'a, C>,
}

impl<C: Config> Iterator for VvIter<'_, C> {
    type Item = VertexHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = match &self.it {
            CwVertexCirculator::Empty => return None,
            CwVertexCirculator::NonEmpty { mesh, .. } => *mesh,
        };
        self.it.next().map(|outgoing| *mesh[outgoing].target)
    }
}

/// Iterator over the faces adjacent to one vertex. Created by
/// [`HalfEdgeMesh::vf`].
///
/// Boundary gaps (outgoing half edges without a face) are skipped, so for a
/// boundary vertex this yields fewer faces than `vv` yields vertices.
#[derive(Debug, Clone)]
pub struct VfIter<'a, C: Config> {
    it: CwVertexCirculator<'a, C>,
}

impl<C: Config> Iterator for VfIter<'_, C> {
    type Item = FaceHandle;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mesh = match &self.it {
                CwVertexCirculator::Empty => return None,
                CwVertexCirculator::NonEmpty { mesh, .. } => *mesh,
            };
            let outgoing = self.it.next()?;
            if let Some(face) = mesh[outgoing].face.into_option() {
                return Some(*face);
            }
        }
    }
}

/// Iterator over the vertices of one face, in the winding order given to
/// `add_face`. Created by [`HalfEdgeMesh::fv`].
#[derive(Debug, Clone)]
pub struct FvIter<'a, C: Config> {
    it: FaceCirculator<'a, C>,
}

impl<C: Config> Iterator for FvIter<'_, C> {
    type Item = VertexHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = match &self.it {
            FaceCirculator::Done => return None,
            FaceCirculator::NonEmpty { mesh, .. } => *mesh,
        };

        // The source of an inner half edge is the target of its twin. The
        // face stores the half edge leaving its first vertex, so mapping to
        // sources yields the creation order.
        self.it.next().map(|inner| *mesh[inner.twin()].target)
    }
}


impl<C: Config> HalfEdgeMesh<C> {
    pub(crate) fn circulate_around_vertex(
        &self,
        vh: Checked<VertexHandle>,
    ) -> CwVertexCirculator<'_, C> {
        CwVertexCirculator::new(self, vh)
    }

    pub(crate) fn circulate_around_face(
        &self,
        fh: Checked<FaceHandle>,
    ) -> FaceCirculator<'_, C> {
        FaceCirculator::new(self, fh)
    }

    /// Iterates over the neighbor vertices of `vh`, in clockwise order.
    /// Empty for an isolated vertex.
    pub fn vv(&self, vh: VertexHandle) -> Result<VvIter<'_, C>, InvalidHandleError> {
        let vh = self.check_vertex(vh)?;
        Ok(VvIter { it: self.circulate_around_vertex(vh) })
    }

    /// Iterates over the faces adjacent to `vh`, in clockwise order. Each
    /// adjacent face is yielded exactly once.
    pub fn vf(&self, vh: VertexHandle) -> Result<VfIter<'_, C>, InvalidHandleError> {
        let vh = self.check_vertex(vh)?;
        Ok(VfIter { it: self.circulate_around_vertex(vh) })
    }

    /// Iterates over the vertices of `fh`, in the order they were passed to
    /// `add_face`.
    pub fn fv(&self, fh: FaceHandle) -> Result<FvIter<'_, C>, InvalidHandleError> {
        let fh = self.check_face(fh)?;
        Ok(FvIter { it: self.circulate_around_face(fh) })
    }

    /// Number of edges adjacent to `vh`.
    pub fn vertex_valence(&self, vh: VertexHandle) -> Result<usize, InvalidHandleError> {
        let vh = self.check_vertex(vh)?;
        Ok(self.circulate_around_vertex(vh).count())
    }

    /// Number of vertices (= edges) of `fh`.
    pub fn face_valence(&self, fh: FaceHandle) -> Result<usize, InvalidHandleError> {
        let fh = self.check_face(fh)?;
        Ok(self.circulate_around_face(fh).count())
    }
}
