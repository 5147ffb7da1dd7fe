//! Shared helpers for nixlayer integration tests.
//!
//! - `TestEnv`: isolated state and config directories plus a CLI runner
//! - Fixtures: config documents reused across tests

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
