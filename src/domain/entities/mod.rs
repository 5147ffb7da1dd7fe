//! Domain Entities
//!
//! - `Config` - One configuration layer document
//! - `Environment` - A named directory of generated manifests
//! - `Backup` - An immutable snapshot archive of the state directory

mod backup;
mod config;
mod environment;

pub use backup::{file_name as backup_file_name, parse_file_name as parse_backup_file_name};
pub use backup::{Backup, ARCHIVE_EXTENSION};
pub use config::{
    Config, ConfigSettings, LogLevel, Metadata, Packages, Script, ToolChoice, CONFIG_KIND,
    CONFIG_VERSION,
};
pub use environment::{
    host_platform, nix_system, template_vars, Environment, EnvironmentTemplate, TemplateVars,
    CUSTOM_FILE, HOME_MANIFEST, PRIMARY_MANIFEST, REQUIRED_ARTIFACTS,
};
