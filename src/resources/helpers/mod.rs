//! Shared helpers for resource code.
pub mod fs;
