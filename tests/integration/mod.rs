//! Integration tests for bw-preflight.
//!
//! These tests run the validation pipeline against temporary workspaces.

pub mod cli_tests;
pub mod output_tests;
pub mod property_tests;
