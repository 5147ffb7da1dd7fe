//! Scenario tests for nixlayer.
//!
//! Scenarios drive the library end to end against a temp state directory,
//! with fake capabilities where a failure has to be injected.
//!
//! Run with: cargo test --test scenarios

mod common;

#[path = "scenarios/switch_lifecycle.rs"]
mod switch_lifecycle;

#[path = "scenarios/backup_lifecycle.rs"]
mod backup_lifecycle;
