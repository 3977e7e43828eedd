//! Test fixtures for BusinessWorks workspaces.
//!
//! Builds throwaway workspaces on disk with application modules, tier files
//! and baseline files, so the full validation pipeline can run against them.

pub mod workspace;

pub use workspace::*;
