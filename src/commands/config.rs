//! Config-level commands: apply, conflicts, import, config show, packages

use std::path::Path;

use anyhow::{Context as _, Result};

use nixlayer::Layer;

use super::Context;
use crate::cli::{ConfigCommands, PackageCommands};
use crate::ui::json;

pub fn cmd_apply(ctx: &Context, force: bool) -> Result<()> {
    let report = ctx.coordinator().apply(force).context("applying configuration")?;
    if ctx.json {
        json::emit(json::data("apply", &report))?;
        return Ok(());
    }
    println!(
        "Applied {} package(s) to '{}' via {}",
        report.packages, report.environment, report.applier
    );
    println!("  snapshot: {}", report.snapshot.display());
    Ok(())
}

pub fn cmd_conflicts(ctx: &Context) -> Result<()> {
    let report = ctx.coordinator().detect_conflicts()?;
    if ctx.json {
        json::emit(json::data(
            "conflicts",
            serde_json::json!({ "conflicts": report }),
        ))?;
    } else {
        println!("{report}");
    }
    Ok(())
}

pub fn cmd_import(ctx: &Context, path: &Path, force: bool) -> Result<()> {
    let report = ctx
        .coordinator()
        .import_project(path, force)
        .with_context(|| format!("importing {}", path.display()))?;
    if ctx.json {
        json::emit(json::data("import", &report))?;
        return Ok(());
    }
    println!(
        "Imported project config '{}'",
        report.config.metadata.name
    );
    println!("  snapshot: {}", report.snapshot.display());
    Ok(())
}

pub fn run_config(ctx: &Context, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { layer } => {
            let coordinator = ctx.coordinator();
            let store = coordinator.store();
            let config = match layer.as_deref() {
                Some(reference) => store.load(&Layer::from_reference(reference)?)?,
                None => store.effective()?,
            };
            if ctx.json {
                json::emit(json::data("config show", serde_json::json!({ "config": config })))?;
            } else {
                print!("{}", serde_yaml_ng::to_string(&config)?);
            }
        }
    }
    Ok(())
}

pub fn run_packages(ctx: &Context, command: PackageCommands) -> Result<()> {
    let coordinator = ctx.coordinator();
    let store = coordinator.store();
    match command {
        PackageCommands::Add { name } => {
            let added = store.add_custom_package(&name)?;
            report_change(ctx, "packages add", &name, added, "Added", "already listed")?;
        }
        PackageCommands::Remove { name } => {
            let removed = store.remove_custom_package(&name)?;
            report_change(ctx, "packages remove", &name, removed, "Removed", "not listed")?;
        }
        PackageCommands::List => {
            let packages = store.custom_packages()?;
            if ctx.json {
                json::emit(json::data(
                    "packages list",
                    serde_json::json!({ "packages": packages }),
                ))?;
            } else {
                for package in &packages {
                    println!("{package}");
                }
            }
        }
    }
    Ok(())
}

fn report_change(
    ctx: &Context,
    command: &str,
    name: &str,
    changed: bool,
    verb: &str,
    unchanged: &str,
) -> Result<()> {
    if ctx.json {
        json::emit(json::data(
            command,
            serde_json::json!({ "package": name, "changed": changed }),
        ))?;
    } else if changed {
        println!("{verb} {name}");
    } else {
        println!("{name}: {unchanged}");
    }
    Ok(())
}
