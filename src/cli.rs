use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nixlayer - layered Nix environment manager
#[derive(Parser, Debug)]
#[command(name = "nixlayer")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'nixlayer init' once to lay out the state directory.")]
pub struct Cli {
    /// State directory (overrides settings and NIXLAYER_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Machine-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the state directory, a personal config and the default environment
    Init,

    /// Regenerate the current environment from the merged config and activate it
    Apply {
        /// Proceed even when layers conflict
        #[arg(short, long)]
        force: bool,
    },

    /// Manage environments
    #[command(subcommand)]
    Env(EnvCommands),

    /// Manage backups of the state directory
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Report mismatches between config layers
    Conflicts,

    /// Install a project config document
    Import {
        /// Path to the YAML document
        path: PathBuf,

        /// Proceed even when it conflicts with the personal config
        #[arg(short, long)]
        force: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage the custom package list
    #[command(subcommand)]
    Packages(PackageCommands),
}

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// Create an environment from the merged config
    Create {
        name: String,
    },

    /// Make an environment current
    Switch {
        name: String,

        /// Proceed even when layers conflict
        #[arg(short, long)]
        force: bool,
    },

    /// List environments
    List,

    /// Show the current environment
    Current,

    /// Restore a backup by timestamp, file name or age (e.g. 2h)
    Rollback {
        #[arg(value_name = "ID|DURATION")]
        identifier: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Snapshot the state directory
    Create {
        /// Label prefixed to the archive name
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List backups, oldest first
    List,

    /// Restore a backup by timestamp or file name
    Restore {
        identifier: String,
    },

    /// Delete a backup
    Delete {
        identifier: String,
    },

    /// Delete all but the newest backups
    Prune {
        /// Number of backups to keep
        #[arg(long, value_name = "N")]
        keep: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the merged configuration, or one layer with --layer
    Show {
        /// personal, project, or a team name
        #[arg(long)]
        layer: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PackageCommands {
    /// Add a package to the custom list
    Add {
        name: String,
    },

    /// Remove a package from the custom list
    Remove {
        name: String,
    },

    /// Print the custom list
    List,
}
