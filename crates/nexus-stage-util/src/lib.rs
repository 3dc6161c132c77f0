//! Shared utilities for the nexus-stage crates.
//!
//! Currently this is the error taxonomy every other crate reports through.

pub mod errors;
