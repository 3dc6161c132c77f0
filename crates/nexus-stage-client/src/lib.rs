//! Client for the Nexus staging REST API.
//!
//! Only the two calls needed to open a staging repository are implemented:
//! listing staging profiles and starting a repository under a profile.

pub mod auth;
pub mod client;
pub mod envelope;

pub use client::{NexusClient, StagingProfile, StagingRepositoryHandle};
