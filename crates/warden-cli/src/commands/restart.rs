use anyhow::Result;
use console::style;

use crate::output::styled_status;
use crate::Context;

/// Execute the restart command
pub async fn execute(ctx: &Context, service: &str) -> Result<()> {
    let record = ctx.resolve(service).await?;
    let record = ctx.orchestrator.restart(&record.id).await?;
    println!(
        "{} {} is {}",
        style("restarted").green(),
        record.name,
        styled_status(record.status),
    );
    Ok(())
}
