//! rollcall CLI - query display status, eligibility and task matching.
//!
//! Reads a JSON snapshot of versions, patches and tasks and prints answers as
//! JSON on stdout. Logs go to stderr and are filtered by `RUST_LOG`.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rollcall_core::{MatchingTasksOptions, TaskId, VersionId};
use rollcall_engine::{
    Engine, EngineConfig, EngineError, Limit, MemoryStore, Snapshot, Store,
};

/// rollcall CLI - status and eligibility queries over a store snapshot
#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Query version status, task eligibility and task matching", long_about = None)]
struct Cli {
    /// Snapshot file with versions, patches and tasks
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum concurrent store queries (a positive integer)
    #[arg(long)]
    max_concurrency: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the display status of a version
    #[command(name = "display-status")]
    DisplayStatus {
        /// Version ID
        id: String,
    },

    /// Check whether a task can be restarted
    #[command(name = "can-restart")]
    CanRestart {
        /// Task ID
        id: String,
    },

    /// Check whether a task can be scheduled
    #[command(name = "can-schedule")]
    CanSchedule {
        /// Task ID
        id: String,
    },

    /// Report which versions contain tasks matching a filter
    Match {
        /// Versions to check (default: every version in the snapshot)
        #[arg(long = "version")]
        versions: Vec<String>,

        /// Task name substring
        #[arg(long = "task-name")]
        task_names: Vec<String>,

        /// Build variant substring
        #[arg(long = "variant")]
        variants: Vec<String>,

        /// Display status label
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Include versions that were never activated
        #[arg(long)]
        include_never_activated: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max) = cli.max_concurrency {
        config = config.with_max_concurrent_queries(Limit::from(max));
    }

    let snapshot = Snapshot::from_file(&cli.snapshot)?;
    let versions = snapshot.versions.len();
    let patches = snapshot.patches.len();
    let store = MemoryStore::from_snapshot(snapshot)?;
    info!(
        snapshot = %cli.snapshot.display(),
        versions,
        patches,
        tasks = store.task_count().await,
        "Loaded snapshot"
    );
    let engine = Engine::new(store.clone(), config);
    debug!(limit = ?engine.config().max_concurrent_queries, "Engine ready");

    match cli.command {
        Commands::DisplayStatus { id } => {
            display_status(&engine, &store, id).await?;
        }
        Commands::CanRestart { id } => {
            let task = find_task(&store, id).await?;
            print_eligibility(&task.id, engine.can_restart_task(&task))?;
        }
        Commands::CanSchedule { id } => {
            let task = find_task(&store, id).await?;
            print_eligibility(&task.id, engine.can_schedule_task(&task))?;
        }
        Commands::Match {
            versions,
            task_names,
            variants,
            statuses,
            include_never_activated,
        } => {
            let filter = MatchingTasksOptions {
                task_names,
                variants,
                statuses,
                include_never_activated_tasks: include_never_activated,
            };
            match_versions(&engine, &store, versions, filter).await?;
        }
    }

    Ok(())
}

async fn display_status(
    engine: &Engine,
    store: &MemoryStore,
    id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = VersionId::new(id);
    let version = store
        .find_version_by_id(&id)
        .await?
        .ok_or_else(|| EngineError::version_not_found(&id))?;

    let report = engine.display_status_report(&version).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn find_task(
    store: &MemoryStore,
    id: String,
) -> Result<rollcall_core::Task, Box<dyn std::error::Error>> {
    let id = TaskId::new(id);
    let task = store.task(&id).await.ok_or_else(|| EngineError::NotFound {
        kind: "task",
        id: id.to_string(),
    })?;
    Ok(task)
}

fn print_eligibility(id: &TaskId, eligible: bool) -> Result<(), Box<dyn std::error::Error>> {
    let out = json!({ "task_id": id, "eligible": eligible });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn match_versions(
    engine: &Engine,
    store: &MemoryStore,
    ids: Vec<String>,
    filter: MatchingTasksOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let versions = if ids.is_empty() {
        store.versions().await
    } else {
        let mut versions = Vec::with_capacity(ids.len());
        for id in ids {
            let id = VersionId::new(id);
            let version = store
                .find_version_by_id(&id)
                .await?
                .ok_or_else(|| EngineError::version_not_found(&id))?;
            versions.push(version);
        }
        versions
    };

    let matches = engine.match_versions(&versions, &filter).await?;
    let sorted: BTreeMap<VersionId, bool> = matches.into_iter().collect();
    println!("{}", serde_json::to_string_pretty(&sorted)?);

    Ok(())
}
