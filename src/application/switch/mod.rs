//! Transactional switch / apply / import / rollback

mod coordinator;
mod report;
mod state;

pub use coordinator::SwitchCoordinator;
pub use report::{ApplyReport, ImportReport, RollbackReport, SwitchReport};
pub use state::{SwitchState, Transaction};
