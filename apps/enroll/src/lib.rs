//! # Enroll Application Library
//!
//! Hosting layer for the `enroll-core` workflow: HTTP API, CLI,
//! configuration, collaborator client and the registry of live
//! registrations. Exposed as a library so integration tests can build the
//! router directly.

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod registry;
