use anyhow::Result;
use console::style;

use crate::Context;

/// Execute the uninstall command
pub async fn execute(ctx: &Context, service: &str) -> Result<()> {
    let record = ctx.resolve(service).await?;
    ctx.orchestrator.uninstall(&record.id).await?;
    println!("{} {}", style("uninstalled").yellow(), record.name);
    Ok(())
}
