#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub use graft_core::*;
pub use graft_macros::{Bean, Record};

pub mod diag;
pub mod options;
pub mod path;

mod builder;
mod copy;
mod flatten;
mod mapper;
mod writer;

pub use diag::{CopyDiagnostics, LogDiagnostics, RecordingDiagnostics};
pub use mapper::Mapper;
pub use options::{CopyOptions, CopyOptionsBuilder};
pub use path::{PropertyPath, Segment};

// Support for derive-generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use graft_core::accessors::*;
}
