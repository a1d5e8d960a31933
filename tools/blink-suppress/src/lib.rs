//! blink-suppress library
//!
//! JSON document I/O and the command implementations behind the
//! `blink-suppress` binary.

pub mod commands;
pub mod io;

pub use commands::{MeshStats, default_output, inspect_mesh, suppress_mesh, suppress_subject};
