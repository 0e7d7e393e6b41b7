use std::sync::Arc;

use anyhow::Result;
use console::style;

use crate::output::print_snapshot;
use crate::Context;

/// Execute the watch command: subscribe to the monitor and print every
/// reconciled snapshot until interrupted
pub async fn execute(ctx: &Context) -> Result<()> {
    let subscription = ctx.monitor.subscribe(Arc::new(|snapshot| {
        println!();
        print_snapshot(snapshot);
        Ok(())
    }));

    ctx.monitor.start();
    println!("{}", style("watching services, ctrl-c to stop").dim());

    tokio::signal::ctrl_c().await?;

    ctx.monitor.stop();
    ctx.monitor.unsubscribe(subscription);
    Ok(())
}
