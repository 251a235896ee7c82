//! The `Checked` wrapper lives in its own module so that its field stays
//! private: the only way to construct one is the `unsafe` constructor below.

use std::{fmt, ops};

use crate::handle::{hsize, Handle, HalfEdgeHandle};


/// A handle that the data structure has verified to point at an existing
/// element.
///
/// Handles coming in through the public API are untrusted and get validated
/// once; from then on the mesh internals pass `Checked` handles around and
/// index their storage without bounds checks. The wrapper is purely a
/// marker: creating one with an invalid handle is not immediately harmful,
/// but using it to index storage is UB, which is why construction is
/// `unsafe`. Dummy instances (created while wiring up new elements) must be
/// overwritten before they are ever read.
#[repr(transparent)] // required: internals cast `&[VertexHandle]`-likes to `&[Checked<_>]`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Checked<H: Handle>(H);

impl<H: Handle> Checked<H> {
    /// Wraps the handle, asserting (not checking!) that it refers to an
    /// existing element.
    #[inline(always)]
    pub(crate) unsafe fn new(handle: H) -> Self {
        Self(handle)
    }
}

impl Checked<HalfEdgeHandle> {
    /// Returns the opposite half edge (the other half of the same edge).
    ///
    /// The two halves of an edge are stored next to each other and the first
    /// pair starts at index 0, so the opposite handle is obtained by
    /// flipping the lowest index bit. The result is again `Checked`: if one
    /// half exists, so does its twin.
    #[inline(always)]
    pub(crate) fn twin(self) -> Checked<HalfEdgeHandle> {
        unsafe { Self::new(HalfEdgeHandle::new(self.idx() ^ 1)) }
    }
}

// `Optioned` storage: the all-ones index serves as the niche for "none".
// Valid meshes can never reach that index since half edge handles would
// overflow `hsize` earlier.
impl<H: Handle> optional::Noned for Checked<H> {
    fn is_none(&self) -> bool {
        self.0.idx() == hsize::max_value()
    }
    fn get_none() -> Self {
        Self(H::new(hsize::max_value()))
    }
}

impl<H: Handle> optional::OptEq for Checked<H> {
    fn opt_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl<H: Handle> fmt::Debug for Checked<H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<H: Handle> ops::Deref for Checked<H> {
    type Target = H;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
