use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;
use tracing::debug;

use warden_core::record::ServiceSpec;

use crate::output::styled_status;
use crate::Context;

/// Execute the create command
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    ctx: &Context,
    name: String,
    exec: PathBuf,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    depends_on: Vec<String>,
    auto_start: bool,
    restart_on_exit: bool,
) -> Result<()> {
    debug!(service = %name, "resolving declared dependencies");
    let mut dependencies = Vec::new();
    for needle in &depends_on {
        match ctx.resolve(needle).await {
            Ok(record) => dependencies.push(record.id),
            Err(_) => bail!("unknown dependency: {}", needle),
        }
    }

    let record = ctx
        .orchestrator
        .create(ServiceSpec {
            name,
            executable: exec,
            arguments: args,
            working_dir: workdir,
            dependencies,
            auto_start,
            restart_on_exit,
        })
        .await?;

    println!(
        "{} {} ({}) is {}",
        style("created").green(),
        record.name,
        style(record.id.to_string()).dim(),
        styled_status(record.status),
    );
    Ok(())
}
