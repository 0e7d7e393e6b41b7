use anyhow::Result;
use console::style;

use crate::output::styled_status;
use crate::Context;

/// Execute the start command
pub async fn execute(ctx: &Context, service: &str, with_dependencies: bool) -> Result<()> {
    let record = ctx.resolve(service).await?;

    if with_dependencies {
        let started = ctx.orchestrator.start_with_dependencies(&record.id).await?;
        println!(
            "{} {} ({} service(s) started)",
            style("started").green(),
            record.name,
            started.len(),
        );
        return Ok(());
    }

    let record = ctx.orchestrator.start(&record.id).await?;
    println!(
        "{} {} is {}",
        style("started").green(),
        record.name,
        styled_status(record.status),
    );
    Ok(())
}
