//! Command-line interface for the Warden service manager.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use warden_core::artifact::ArtifactWriter;
use warden_core::config::WardenConfig;
use warden_core::error::{WardenError, WardenResult};
use warden_core::record::{ServiceId, ServiceRecord};
use warden_core::security::SecurityGate;
use warden_core::store::ServiceStore;
use warden_daemon::{JsonStore, LifecycleOrchestrator, StatusMonitor, WrapperGateway};

mod commands;
mod output;

pub use output::*;

/// CLI arguments parser
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new service
    Create {
        /// Display name
        name: String,

        /// Program to run
        #[arg(short, long)]
        exec: PathBuf,

        /// Arguments passed to the program
        #[arg(short, long)]
        args: Vec<String>,

        /// Working directory
        #[arg(short, long)]
        workdir: Option<PathBuf>,

        /// Names or ids of services this one depends on
        #[arg(short, long)]
        depends_on: Vec<String>,

        /// Start the service right after install
        #[arg(long)]
        auto_start: bool,

        /// Restart the program when it exits
        #[arg(long)]
        restart_on_exit: bool,
    },

    /// Start a service
    Start {
        /// Service name or id
        service: String,

        /// Also start everything it depends on, dependencies first
        #[arg(long)]
        with_dependencies: bool,
    },

    /// Stop a service
    Stop {
        /// Service name or id
        service: String,
    },

    /// Restart a service
    Restart {
        /// Service name or id
        service: String,
    },

    /// Unregister a service from the OS and remove it
    Uninstall {
        /// Service name or id
        service: String,
    },

    /// Remove a service record, best-effort unregistering it first
    Delete {
        /// Service name or id
        service: String,
    },

    /// List all services
    List,

    /// Show a service's computed startup order
    Order {
        /// Service name or id
        service: String,
    },

    /// Watch reconciled status snapshots
    Watch,
}

/// Assembled runtime the commands operate on
pub struct Context {
    pub store: Arc<dyn ServiceStore>,
    pub orchestrator: Arc<LifecycleOrchestrator>,
    pub monitor: StatusMonitor,
}

impl Context {
    /// Wire a context from configuration
    pub async fn from_config(config: &WardenConfig) -> WardenResult<Self> {
        config.validate()?;
        let artifacts = ArtifactWriter::new(config.artifact_dir.clone());
        let store: Arc<dyn ServiceStore> =
            Arc::new(JsonStore::open(config.store_path.clone()).await?);
        let gateway = Arc::new(WrapperGateway::new(
            config.wrapper_path.clone(),
            artifacts.clone(),
        ));
        let orchestrator = Arc::new(LifecycleOrchestrator::new(
            Arc::clone(&store),
            gateway.clone(),
            SecurityGate::new(),
            artifacts,
        ));
        let monitor = StatusMonitor::new(Arc::clone(&store), gateway, config.monitor.clone());
        Ok(Self {
            store,
            orchestrator,
            monitor,
        })
    }

    /// Resolve a user-supplied service reference, by id first, then by
    /// display name
    pub async fn resolve(&self, needle: &str) -> WardenResult<ServiceRecord> {
        if let Some(id) = ServiceId::parse(needle) {
            if let Some(record) = self.store.get(&id).await? {
                return Ok(record);
            }
        }
        let all = self.store.load_all().await?;
        all.into_iter()
            .find(|r| r.name == needle)
            .ok_or_else(|| WardenError::not_found(needle.to_string()))
    }
}

/// Execute a parsed command against a wired context
pub async fn run(cli: Cli, ctx: &Context) -> Result<()> {
    match cli.command {
        Commands::Create {
            name,
            exec,
            args,
            workdir,
            depends_on,
            auto_start,
            restart_on_exit,
        } => {
            commands::create::execute(
                ctx,
                name,
                exec,
                args,
                workdir,
                depends_on,
                auto_start,
                restart_on_exit,
            )
            .await?
        }
        Commands::Start {
            service,
            with_dependencies,
        } => commands::start::execute(ctx, &service, with_dependencies).await?,
        Commands::Stop { service } => commands::stop::execute(ctx, &service).await?,
        Commands::Restart { service } => commands::restart::execute(ctx, &service).await?,
        Commands::Uninstall { service } => commands::uninstall::execute(ctx, &service).await?,
        Commands::Delete { service } => commands::delete::execute(ctx, &service).await?,
        Commands::List => commands::list::execute(ctx).await?,
        Commands::Order { service } => commands::order::execute(ctx, &service).await?,
        Commands::Watch => commands::watch::execute(ctx).await?,
    }
    Ok(())
}
