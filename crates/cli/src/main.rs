// crates/cli/src/main.rs
//! Thin command-line surface over the ingestion core. The dashboard layer
//! consumes the same operations; this binary exists for manual syncs and
//! inspection.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use claude_scope_db::{status, sync, Database};

#[derive(Parser)]
#[command(name = "claude-scope", about = "Local usage analytics for Claude Code sessions")]
struct Cli {
    /// Session-history root (defaults to ~/.claude/projects)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Database file (defaults to ~/.cache/claude-scope/claude-scope.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full sync pass and report what was ingested
    Sync,
    /// Show whether a session root exists and current store counts
    Status,
    /// Empty the cache store
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => claude_scope_core::paths::default_projects_root()
            .ok_or_else(|| anyhow!("could not determine home directory"))?,
    };

    let db = match cli.db {
        Some(path) => Database::new(&path).await,
        None => Database::open_default().await,
    }
    .context("failed to open cache database")?;

    match cli.command {
        Command::Sync => {
            let report = sync(&db, &root).await?;
            if !report.root_found {
                println!("No session root found at {}", root.display());
                return Ok(());
            }
            println!(
                "Synced {} projects, {} sessions",
                report.projects.len(),
                report.sessions.len()
            );
            if !report.errors.is_empty() {
                eprintln!("{} errors:", report.errors.len());
                for err in &report.errors {
                    eprintln!("  {err}");
                }
            }
        }
        Command::Status => {
            let s = status(&db, &root).await?;
            println!(
                "root: {} ({})",
                root.display(),
                if s.root_found { "found" } else { "missing" }
            );
            println!("projects: {}", s.project_count);
            println!("sessions: {}", s.session_count);
        }
        Command::Clear => {
            db.clear_all().await?;
            println!("Cache cleared");
        }
    }

    db.close().await;
    Ok(())
}
