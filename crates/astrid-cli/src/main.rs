//! Astrid CLI — thin entry point over the host (§6 External Interfaces).
//!
//! One foreground verb (`run`) that owns the process until it receives a
//! shutdown signal or a chat-triggered redeploy, plus one setup verb per
//! channel adapter (`auth-<channel>`). Concrete channel adapters are out of
//! scope for this workspace (§1) — `run` always starts with zero channels
//! registered, and `auth` is the documented seam a deployment's own
//! adapter crate would plug into.
//!
//! `status`, `sessions`, and `audit tail` are read-only inspection verbs
//! over the same on-disk data root `run` uses — there is no separate
//! daemon process to query here, so they open the store and audit log
//! directly rather than going through a client/daemon split.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use astrid_audit::AuditLog;
use astrid_kernel::Host;
use astrid_runtime::CommandSpawner;
use astrid_storage::Store;
use astrid_telemetry::{LogConfig, LogFormat, LogTarget};
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Astrid — multi-tenant agent orchestration host.
#[derive(Parser)]
#[command(name = "astrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration overlay. Defaults embedded; `ASTRID_*`
    /// environment variables apply last regardless of this flag.
    #[arg(short, long, global = true, env = "ASTRID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the host in the foreground until shutdown or redeploy.
    Run,

    /// Complete one-time credential setup for a channel adapter.
    #[command(name = "auth")]
    Auth {
        /// Channel name, e.g. `telegram`, `slack`, `whatsapp`.
        channel: String,
    },

    /// Print a summary of the data root: workspace count and which ones
    /// currently hold a live session.
    Status,

    /// List every registered workspace and its session binding, if any.
    Sessions,

    /// Inspect the audit log.
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
}

#[derive(Subcommand)]
enum AuditCommands {
    /// Print the most recent audit events, oldest first, optionally
    /// filtered to one workspace.
    Tail {
        /// Restrict to this workspace's folder.
        #[arg(long)]
        workspace: Option<String>,
        /// How many of the most recent events to show.
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();

    match cli.command {
        Commands::Run => run(config_path.as_deref()).await,
        Commands::Auth { channel } => auth(&channel),
        Commands::Status => status(config_path.as_deref()).await,
        Commands::Sessions => sessions(config_path.as_deref()).await,
        Commands::Audit { command: AuditCommands::Tail { workspace, count } } => {
            audit_tail(config_path.as_deref(), workspace.as_deref(), count).await
        }
    }
}

/// The `run` verb: load configuration, install the subscriber, build the
/// [`Host`], and block until it returns. Exit code `0` on a clean
/// shutdown; any error here propagates to a non-zero exit (§6).
async fn run(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = astrid_config::load(config_path).context("loading configuration")?;

    let log_target = match &config.telemetry.log_dir {
        Some(dir) => LogTarget::File(dir.clone()),
        None => LogTarget::Stderr,
    };
    let log_format = if config.telemetry.json { LogFormat::Json } else { LogFormat::Pretty };
    let log_config = LogConfig::new(config.telemetry.filter.clone()).with_format(log_format).with_target(log_target);
    astrid_telemetry::setup_logging(&log_config).context("initializing logging")?;

    println!("{}", "Starting Astrid host...".cyan().bold());
    println!("  Data root: {}", config.data_root.display().to_string().yellow());
    println!(
        "  Chat redeploy: {}",
        if config.commands.allow_chat_redeploy { "enabled".green() } else { "disabled".red() }
    );

    // No concrete channel adapters ship in this workspace (§1); a
    // deployment that links one in constructs it here and passes it
    // through instead of the empty vec.
    let spawner = CommandSpawner::new("astrid-worker");
    let host = Arc::new(Host::new(config, spawner, Vec::new()).await.context("constructing host")?);

    tracing::info!("host starting");
    host.run().await.context("running host")?;

    println!("{}", "Astrid host stopped.".green());
    Ok(())
}

/// The `auth-<channel>` verb family, collapsed to one subcommand taking
/// the channel name as an argument. With no bundled adapters, this simply
/// reports that fact; a deployment's adapter crate replaces this function
/// with its own device-code or token exchange flow.
fn auth(channel: &str) -> Result<()> {
    println!("{}", format!("No bundled adapter for channel '{channel}'.").yellow());
    println!("  Concrete channel adapters are out of scope for this workspace;");
    println!("  link one in and give it its own credential setup flow.");
    Ok(())
}

/// Open the store at `config.data_root` without building a full [`Host`] —
/// these verbs only read, they never spawn workers or route messages.
async fn open_store(config_path: Option<&std::path::Path>) -> Result<Store> {
    let config = astrid_config::load(config_path).context("loading configuration")?;
    let db_path = config.data_root.join("db");
    Store::open(&db_path.to_string_lossy()).await.context("opening state store")
}

async fn status(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = astrid_config::load(config_path).context("loading configuration")?;
    let store = open_store(config_path).await?;
    let workspaces = store.workspaces.list().await.context("listing workspaces")?;

    let mut live_sessions = 0usize;
    for workspace in &workspaces {
        if store.sessions.get(&workspace.folder).await.context("reading session")?.is_some() {
            live_sessions += 1;
        }
    }

    println!("{}", "Astrid host status".cyan().bold());
    println!("  Data root: {}", config.data_root.display().to_string().yellow());
    println!("  Workspaces: {}", workspaces.len());
    println!("  Live sessions: {live_sessions}");
    println!(
        "  Chat redeploy: {}",
        if config.commands.allow_chat_redeploy { "enabled".green() } else { "disabled".red() }
    );
    Ok(())
}

async fn sessions(config_path: Option<&std::path::Path>) -> Result<()> {
    let store = open_store(config_path).await?;
    let workspaces = store.workspaces.list().await.context("listing workspaces")?;

    if workspaces.is_empty() {
        println!("{}", "No workspaces registered".yellow());
        return Ok(());
    }

    println!("{:>24} {:>10} {}", "WORKSPACE".dimmed(), "ADMIN".dimmed(), "SESSION".dimmed());
    for workspace in workspaces {
        let session = store.sessions.get(&workspace.folder).await.context("reading session")?;
        let session_str = session.map_or_else(|| "-".dimmed().to_string(), |s| s.token.0.green().to_string());
        println!("{:>24} {:>10} {session_str}", workspace.folder.0, if workspace.is_admin { "yes" } else { "no" });
    }
    Ok(())
}

async fn audit_tail(config_path: Option<&std::path::Path>, workspace: Option<&str>, count: usize) -> Result<()> {
    let config = astrid_config::load(config_path).context("loading configuration")?;
    let log = AuditLog::new(config.data_root.join("audit"));

    let mut events = match workspace {
        Some(w) => log.read_for_workspace(w).await.context("reading audit log")?,
        None => log.read_all().await.context("reading audit log")?,
    };

    let start = events.len().saturating_sub(count);
    events.drain(..start);

    if events.is_empty() {
        println!("{}", "No audit entries".yellow());
        return Ok(());
    }

    println!("{:>20} {:>12} {:>16} {}", "TIMESTAMP".dimmed(), "DECISION".dimmed(), "TOOL".dimmed(), "REASON".dimmed());
    for event in events {
        let decision = match event.decision {
            astrid_core::Decision::Allow => "allow".green().to_string(),
            astrid_core::Decision::Deny => "deny".red().to_string(),
            astrid_core::Decision::NeedsHuman => "needs-human".yellow().to_string(),
        };
        println!("{:>20} {:>12} {:>16} {}", event.timestamp.to_string(), decision, event.tool_name, event.reason);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }
}
