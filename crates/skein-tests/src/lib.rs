//! Shared helpers for Skein integration tests.

pub mod helpers;
