//! nixlayer CLI
//!
//! Usage: nixlayer [--root DIR] [--json] [-v...] <COMMAND>
//!
//! Commands:
//!   init       Lay out the state directory
//!   apply      Regenerate and activate the current environment
//!   env        Create, switch, list and roll back environments
//!   backup     Create, list, restore, delete and prune backups
//!   conflicts  Report mismatches between config layers
//!   import     Install a project config document
//!   config     Print the merged configuration
//!   packages   Manage the custom package list

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod ui;

use cli::Cli;
use commands::Context;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    let result = Context::from_cli(&cli).and_then(|ctx| commands::run(cli, &ctx));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error, json: bool) {
    if fatal(err) {
        tracing::error!(error = %format!("{err:#}"), "rollback failed; state may be inconsistent");
    }
    if json {
        let _ = ui::json::emit(ui::json::error(&format!("{err:#}")));
        return;
    }
    eprintln!("Error: {err}");
    let mut previous = err.to_string();
    for cause in err.chain().skip(1) {
        let text = cause.to_string();
        // Io errors already print their source inline.
        if previous.contains(&text) {
            continue;
        }
        eprintln!("  {}", text.replace('\n', "\n  "));
        previous = text;
    }
}

fn fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<nixlayer::NixlayerError>())
        .any(nixlayer::NixlayerError::is_fatal)
}
