use anyhow::Result;
use console::style;

use crate::Context;

/// Execute the delete command
pub async fn execute(ctx: &Context, service: &str) -> Result<()> {
    let record = ctx.resolve(service).await?;
    ctx.orchestrator.delete(&record.id).await?;
    println!("{} {}", style("deleted").red(), record.name);
    Ok(())
}
