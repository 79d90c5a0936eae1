//! Query subsystem
//!
//! [`compiler`] turns a group query into parallel expression programs;
//! [`merge`] reassembles the engine's raw outputs into per-series results.

pub mod compiler;
pub mod merge;

pub use compiler::{compile, CompiledQuery};
pub use merge::merge;
