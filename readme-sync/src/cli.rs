//! # readme-sync CLI Interface (Module)
//!
//! This module implements the full CLI interface for readme-sync: command
//! parsing, argument validation, and the main entrypoint for user-visible
//! invocations.
//!
//! All core business logic (parsing, the sync decision procedure, and
//! orchestration) lives in the [`readme-sync-core`] crate. This module is
//! strictly for CLI glue: loading the environment configuration, constructing
//! the two API clients, and turning the run report into an exit status.
//!
//! ## Features
//! - Entry struct [`Cli`] defines all user-facing options and subcommands.
//! - Subcommand routing (e.g., `sync`) and argument validation.
//! - Async entrypoint (`run`) for programmatic invocation and integration
//!   testing.
//! - Logging, tracing, and structured error output at CLI level.
//!
//! ## How To Use
//! - For command-line users: use the installed `readme-sync` binary with
//!   `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed
//!   [`Cli`].
//!
//! [`readme-sync-core`]: ../../readme-sync-core/

use anyhow::Result;
use clap::{Parser, Subcommand};
use readme_sync_core::config::SyncConfig;
use readme_sync_core::synchronise::synchronise;

use crate::github::GitHubClient;
use crate::load_config::load_config;
use crate::readme::ReadmeClient;

/// CLI for readme-sync: publish a repository's markdown docs to ReadMe.
#[derive(Parser)]
#[clap(
    name = "readme-sync",
    version,
    about = "Sync markdown files with front-matter metadata to a ReadMe documentation host"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize all markdown docs under the configured path to the host
    Sync {
        /// Repository path to scan, overriding the FILE_PATH environment input
        #[clap(long)]
        path: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let result = match cli.command {
        Commands::Sync { path } => {
            let run_config = load_config()?;
            tracing::info!(command = "sync", "Starting synchronisation process");

            let source = GitHubClient::new(
                &run_config.repo_token,
                &run_config.repository,
                run_config.git_ref.as_deref(),
            )?;
            let host = ReadmeClient::new(
                &run_config.readme_api_key,
                &run_config.readme_api_version,
            )?;

            let config = SyncConfig {
                repo: run_config.repository.clone(),
                path: path.unwrap_or(run_config.file_path),
            };
            config.trace_loaded();

            match synchronise(&config, &source, &host).await {
                Ok(report) => match report.first_failure() {
                    None => {
                        tracing::info!(command = "sync", ?report, "Synchronisation complete");
                        Ok(())
                    }
                    Some((doc, err)) => {
                        tracing::error!(
                            command = "sync",
                            path = %doc.path,
                            error = %err,
                            "Synchronisation finished with failed documents"
                        );
                        Err(anyhow::anyhow!(
                            "document '{}' failed to sync: {err}",
                            doc.path
                        ))
                    }
                },
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    };

    result
}
