//! Project file access.
//!
//! Everything that touches the filesystem or raw markup lives here:
//! - `substvar`: parsing a substvar file into a `VariableMap`
//! - `layout`: finding the application module that owns a tier file
//! - `baseline`: validating and loading a tier's baseline file

pub mod baseline;
pub mod layout;
pub mod substvar;
