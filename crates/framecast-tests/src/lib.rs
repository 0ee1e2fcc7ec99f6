//! Integration test crate for Framecast.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, timeline, and scheduler crates to verify they
//! work together.

#[cfg(test)]
mod scheduling;

#[cfg(test)]
mod timeline;
