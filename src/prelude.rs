//! Reexports of all important traits of this library for convenience.
//!
//! As usual, it is intended to be glob imported: `use hemesh::prelude::*;`.
//! You can still use items explicitly if you prefer.

pub use crate::{
    core::{Config, FaceKind},
    handle::Handle,
};
