use anyhow::Result;

use crate::output::print_snapshot;
use crate::Context;

/// Execute the list command
pub async fn execute(ctx: &Context) -> Result<()> {
    let records = ctx.store.load_all().await?;
    print_snapshot(&records);
    Ok(())
}
