//! `nixlayer env ...`

use anyhow::{Context as _, Result};

use nixlayer::domain::entities::Environment;

use super::Context;
use crate::cli::EnvCommands;
use crate::ui::json;

pub fn run(ctx: &Context, command: EnvCommands) -> Result<()> {
    match command {
        EnvCommands::Create { name } => cmd_create(ctx, &name),
        EnvCommands::Switch { name, force } => cmd_switch(ctx, &name, force),
        EnvCommands::List => cmd_list(ctx),
        EnvCommands::Current => cmd_current(ctx),
        EnvCommands::Rollback { identifier } => cmd_rollback(ctx, &identifier),
    }
}

fn cmd_create(ctx: &Context, name: &str) -> Result<()> {
    let environment = ctx
        .coordinator()
        .create_environment(name)
        .with_context(|| format!("creating environment '{name}'"))?;
    if ctx.json {
        json::emit(json::data("env create", environment_json(&environment)))?;
    } else {
        println!(
            "Created environment '{}' at {}",
            environment.name,
            environment.path.display()
        );
    }
    Ok(())
}

fn cmd_switch(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let report = ctx
        .coordinator()
        .switch(name, force)
        .with_context(|| format!("switching to '{name}'"))?;
    if ctx.json {
        json::emit(json::data("env switch", &report))?;
        return Ok(());
    }
    match &report.from {
        Some(from) => println!("Switched {from} -> {}", report.to),
        None => println!("Switched to {}", report.to),
    }
    println!("  snapshot: {}", report.snapshot.display());
    Ok(())
}

fn cmd_list(ctx: &Context) -> Result<()> {
    let environments = ctx.coordinator().registry().list()?;
    if ctx.json {
        let items: Vec<_> = environments.iter().map(environment_json).collect();
        json::emit(json::data("env list", serde_json::json!({ "environments": items })))?;
        return Ok(());
    }
    if environments.is_empty() {
        println!("No environments. Run 'nixlayer init' or 'nixlayer env create <name>'.");
        return Ok(());
    }
    for environment in &environments {
        let marker = if environment.is_current { "*" } else { " " };
        println!("{marker} {}", environment.name);
    }
    Ok(())
}

fn cmd_current(ctx: &Context) -> Result<()> {
    let coordinator = ctx.coordinator();
    let registry = coordinator.registry();
    let name = registry.current_name()?;
    let path = registry.resolve_current()?;
    if ctx.json {
        json::emit(json::data(
            "env current",
            serde_json::json!({
                "name": name.as_ref().map(ToString::to_string),
                "path": path,
                "pointer": name.is_some(),
            }),
        ))?;
        return Ok(());
    }
    match name {
        Some(name) => println!("{name} ({})", path.display()),
        None => println!(
            "{} (no current pointer; using the default environment)",
            path.display()
        ),
    }
    Ok(())
}

fn cmd_rollback(ctx: &Context, identifier: &str) -> Result<()> {
    let report = ctx
        .coordinator()
        .rollback(identifier)
        .with_context(|| format!("rolling back to '{identifier}'"))?;
    if ctx.json {
        json::emit(json::data("env rollback", &report))?;
        return Ok(());
    }
    println!("Restored {}", report.restored.file_name());
    println!("  previous state saved to {}", report.snapshot.display());
    Ok(())
}

fn environment_json(environment: &Environment) -> serde_json::Value {
    serde_json::json!({
        "name": environment.name.to_string(),
        "path": environment.path,
        "current": environment.is_current,
    })
}
