//! Step-list assembly
//!
//! Composes the core transformations into the sequential run that turns a
//! YAML pipeline declaration into the emitted Buildkite step list.

pub mod commands;
pub mod engine;
pub mod finalize;

pub use engine::{Assembler, EarlyFilter};
pub use finalize::Finalizer;
