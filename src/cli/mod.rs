//! Command line interface.
//!
//! Provides argument parsing and output formatting.

pub mod args;
pub mod output;
