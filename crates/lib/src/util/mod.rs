//! Shared utilities.
//!
//! Content hashing for the artifact manifest, plus test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
