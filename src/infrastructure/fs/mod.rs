//! File system helpers
//!
//! Every write that changes canonical state goes through a temporary
//! resource in the target directory and is renamed into place.

mod atomic;
mod mirror;

pub use atomic::{copy_atomic, create_symlink, read_link_target, replace_symlink, write_atomic};
pub use mirror::mirror_dir;
