//! Archiver adapters

mod tar_gz;

pub use tar_gz::TarGzArchiver;
