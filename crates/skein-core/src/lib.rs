//! # skein-core
//! Identifier types and error taxonomy for the Skein clustering toolkit.

pub mod error;
pub mod types;
