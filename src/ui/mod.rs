//! Terminal output helpers for the binary.

pub mod format;
pub mod json;
