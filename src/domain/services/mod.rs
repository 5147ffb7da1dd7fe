//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod config_merger;
mod conflict_detector;
mod validator;

pub use config_merger::{merge, merge_all, ordered_union, sort_by_priority};
pub use conflict_detector::{detect_conflicts, ConflictReport};
pub use validator::validate;
