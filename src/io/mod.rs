//! Reading and writing meshes in a simple OBJ-style text format.
//!
//! See [`obj`] for the format itself. This module only holds the error
//! types shared by all I/O operations.

use std::{fmt, io};

use failure::Fail;

use crate::error::TopologyError;

pub mod obj;

pub use self::obj::{read_trimesh, read_trimesh_from, write_mesh, write_mesh_to};


/// The error type for mesh reading and writing.
#[derive(Debug, Fail)]
pub enum Error {
    /// The underlying reader or writer failed.
    #[fail(display = "IO error: {}", _0)]
    Io(#[fail(cause)] io::Error),

    /// The input is not syntactically valid.
    #[fail(display = "Parse error: {}", _0)]
    Parse(#[fail(cause)] ParseError),

    /// The input is syntactically fine, but describes a mesh that violates
    /// the structural rules (non-manifold, bad indices, ...).
    #[fail(display = "input describes an invalid mesh: {}", _0)]
    Topology(#[fail(cause)] TopologyError),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}

impl From<ParseError> for Error {
    fn from(src: ParseError) -> Self {
        Error::Parse(src)
    }
}

impl From<TopologyError> for Error {
    fn from(src: TopologyError) -> Self {
        Error::Topology(src)
    }
}

/// A syntax error in the input, with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub struct ParseError {
    pub line: u64,
    pub msg: String,
}

impl ParseError {
    pub(crate) fn new(line: u64, msg: impl Into<String>) -> Self {
        Self { line, msg: msg.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.msg)
    }
}
