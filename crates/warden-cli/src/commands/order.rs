use anyhow::Result;
use console::style;

use crate::Context;

/// Execute the order command: print the computed startup chain
pub async fn execute(ctx: &Context, service: &str) -> Result<()> {
    let record = ctx.resolve(service).await?;
    let report = ctx.orchestrator.startup_order(&record.id).await?;

    if !report.is_valid {
        println!("{}", style("dependency graph is invalid:").red());
        for message in report.messages() {
            println!("  - {}", message);
        }
    }

    let all = ctx.store.load_all().await?;
    let name_of = |id| {
        all.iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("{}", id))
    };

    println!("startup order for {}:", record.name);
    for (i, id) in report.startup_order.iter().enumerate() {
        println!("  {}. {}", i + 1, name_of(*id));
    }
    Ok(())
}
