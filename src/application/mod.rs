//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `SwitchCoordinator` - Conflict check, safety snapshot, mutation, automatic rollback
//! - `InitUseCase` - Lays out a fresh state directory

pub mod init;
pub mod switch;

pub use init::{InitReport, InitUseCase};
pub use switch::{
    ApplyReport, ImportReport, RollbackReport, SwitchCoordinator, SwitchReport, SwitchState,
    Transaction,
};
