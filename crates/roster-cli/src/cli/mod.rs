//! CLI for the roster client and fault-injection provider.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roster_core::config;
use roster_core::model::DepartmentId;
use std::net::SocketAddr;

use commands::{run_create, run_list, run_serve, CreateArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Resilient department-employee client and fault-injection provider", long_about = None)]
pub struct Cli {
    /// Base URL of the upstream service (overrides config and ROSTER_SERVICE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the employees of a department.
    List {
        /// Department identifier (UUID).
        department: DepartmentId,
        /// Check the response against the provider's contract.
        #[arg(long)]
        check: bool,
    },

    /// Create an employee in a department.
    Create {
        /// Department identifier (UUID).
        department: DepartmentId,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Check the response against the provider's contract.
        #[arg(long)]
        check: bool,
    },

    /// Run the fault-injection provider.
    Serve {
        /// Address to bind (default from config).
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(url) = cli.url {
            cfg.upstream.base_url = url;
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::List { department, check } => run_list(&cfg, department, check).await?,
            CliCommand::Create {
                department,
                email,
                first_name,
                last_name,
                check,
            } => {
                let args = CreateArgs {
                    department,
                    email,
                    first_name,
                    last_name,
                    check,
                };
                run_create(&cfg, args).await?
            }
            CliCommand::Serve { bind } => run_serve(&cfg, bind).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
