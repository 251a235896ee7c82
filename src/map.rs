//! Dense property storage keyed by handles.
//!
//! A [`DenseMap`] associates a value with every handle of one element kind.
//! The handle's index is used directly as an index into a contiguous vector,
//! so lookups are plain array accesses and the values of all elements form
//! one contiguous slice. This works because all handle sources in this
//! library hand out sequentially increasing indices and storage is
//! append-only (indices stay stable, see the crate documentation).

use std::{
    fmt,
    marker::PhantomData,
    ops::{Index, IndexMut, Range},
};

use crate::handle::{hsize, Handle};


/// A property map backed by a contiguous vector, indexed by handle.
///
/// Cloning a `DenseMap` deep-copies all values; the clone shares no storage
/// with the original.
#[derive(Clone)]
pub struct DenseMap<H: Handle, T> {
    vec: Vec<T>,
    _dummy: PhantomData<H>,
}

impl<H: Handle, T> DenseMap<H, T> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            vec: Vec::new(),
            _dummy: PhantomData,
        }
    }

    /// Appends a value and returns the handle of the new element. Handles
    /// are handed out with sequentially increasing indices starting at 0.
    pub fn push(&mut self, elem: T) -> H {
        let out = H::from_usize(self.vec.len());
        self.vec.push(elem);
        out
    }

    /// Number of stored elements.
    pub fn num_elements(&self) -> hsize {
        self.vec.len() as hsize
    }

    /// Returns `true` if the given handle refers to an element of this map.
    pub fn contains_handle(&self, handle: H) -> bool {
        handle.to_usize() < self.vec.len()
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.vec.get(handle.to_usize())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.vec.get_mut(handle.to_usize())
    }

    /// Returns a reference to the element without a bounds check.
    ///
    /// The caller must guarantee that `handle` refers to an existing
    /// element, or this causes UB.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked(&self, handle: H) -> &T {
        self.vec.get_unchecked(handle.to_usize())
    }

    /// Like [`Self::get_unchecked`], but mutable.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked_mut(&mut self, handle: H) -> &mut T {
        self.vec.get_unchecked_mut(handle.to_usize())
    }

    /// All values as one contiguous slice, ordered by handle index.
    pub fn as_slice(&self) -> &[T] {
        &self.vec
    }

    /// All values as one contiguous mutable slice, ordered by handle index.
    /// Writing through this slice is writing to the authoritative storage.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.vec
    }

    /// Iterator over all handles of this map, in increasing index order.
    pub fn handles(&self) -> Handles<H> {
        Handles {
            range: 0..self.num_elements(),
            _dummy: PhantomData,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.vec.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.vec.iter_mut()
    }

    pub fn reserve(&mut self, additional: hsize) {
        self.vec.reserve(additional as usize);
    }
}

impl<H: Handle, T: Clone> DenseMap<H, T> {
    /// Creates a map with `count` copies of `elem` (handles 0 to
    /// `count - 1`).
    pub fn from_elem(elem: T, count: usize) -> Self {
        Self {
            vec: vec![elem; count],
            _dummy: PhantomData,
        }
    }
}

impl<H: Handle, T> Index<H> for DenseMap<H, T> {
    type Output = T;

    fn index(&self, handle: H) -> &Self::Output {
        match self.get(handle) {
            Some(out) => out,
            None => panic!("{:?} is not a valid handle for this map", handle),
        }
    }
}

impl<H: Handle, T> IndexMut<H> for DenseMap<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut Self::Output {
        match self.get_mut(handle) {
            Some(out) => out,
            None => panic!("{:?} is not a valid handle for this map", handle),
        }
    }
}

impl<H: Handle, T> Default for DenseMap<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T: fmt::Debug> fmt::Debug for DenseMap<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.handles().map(|h| (h, &self[h])))
            .finish()
    }
}

/// Iterator over the handles of a [`DenseMap`], in increasing index order.
/// Also used for the element iterators of the mesh (`vertices()`, `faces()`
/// and friends).
#[derive(Debug, Clone)]
pub struct Handles<H: Handle> {
    range: Range<hsize>,
    _dummy: PhantomData<H>,
}

impl<H: Handle> Handles<H> {
    pub(crate) fn up_to(count: hsize) -> Self {
        Self {
            range: 0..count,
            _dummy: PhantomData,
        }
    }
}

impl<H: Handle> Iterator for Handles<H> {
    type Item = H;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(H::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<H: Handle> ExactSizeIterator for Handles<H> {}

impl<H: Handle> DoubleEndedIterator for Handles<H> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(H::new)
    }
}
