//! Core types for nexus-stage.
//!
//! The publishing extension and its resolved [`config::ServerConfig`], the
//! build-property lookup used for credential defaults, and the traits that
//! separate this crate family from the host build system.

pub mod config;
pub mod extension;
pub mod host;
pub mod properties;
