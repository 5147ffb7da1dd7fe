//! `nixlayer init`

use anyhow::Result;

use nixlayer::InitUseCase;

use super::Context;
use crate::ui::json;

pub fn cmd_init(ctx: &Context) -> Result<()> {
    let coordinator = ctx.coordinator();
    let report = InitUseCase::new(
        coordinator.store(),
        coordinator.registry(),
        coordinator.template(),
    )
    .execute()?;

    if ctx.json {
        json::emit(json::data("init", &report))?;
        return Ok(());
    }

    if !report.changed() {
        println!("Already initialized: {}", report.root);
        return Ok(());
    }
    println!("Initialized {}", report.root);
    if report.created_personal {
        println!("  created personal config");
    }
    if let Some(name) = &report.created_environment {
        println!("  created environment '{name}'");
    }
    if report.created_pointer {
        println!("  current -> environments/{}", ctx.settings.default_environment);
    }
    Ok(())
}
