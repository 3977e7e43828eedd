//! Validation engine module.
//!
//! Provides tier orchestration and result aggregation.

pub mod orchestrator;
pub mod result;
