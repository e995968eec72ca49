use async_trait::async_trait;
use clap::{Args, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use warden_checker::CheckConfig;
use warden_core::{Batch, ConformancePolicy};

pub mod check;
pub mod table;

use thiserror::Error;

/// Errors that can occur while driving the checker.
#[derive(Debug, Error)]
pub enum CliError {
    /// Batch or config file could not be read.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// Batch or config input is malformed.
    #[error("input error: {0}")]
    Input(#[from] warden_core::Error),
    /// Checking failed before producing a report.
    #[error("checker error: {0}")]
    Checker(#[from] warden_checker::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The batch was checked and diagnostics were reported.
    #[error("{0} diagnostic(s) reported")]
    Rejected(usize),
}

/// Interface conformance policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Implementation qualifiers must equal the interface's.
    Exact,
    /// Implementations may be stricter than the interface.
    AllowStricter,
}

impl From<PolicyArg> for ConformancePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Exact => ConformancePolicy::Exact,
            PolicyArg::AllowStricter => ConformancePolicy::AllowStricter,
        }
    }
}

/// Input and configuration options shared by every subcommand.
#[derive(Args)]
pub struct BatchArgs {
    /// JSON batch of declarations and compilation units.
    pub batch: PathBuf,
    /// JSON file with a checker configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Interface conformance policy; overrides the config file.
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

impl BatchArgs {
    /// Loads the configuration: file first, then command-line overrides.
    pub fn config(&self) -> Result<CheckConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => CheckConfig::load(path)?,
            None => CheckConfig::default(),
        };
        if let Some(policy) = self.policy {
            config.policy = policy.into();
        }
        Ok(config)
    }

    pub async fn load_batch(&self) -> Result<Batch, CliError> {
        let raw = tokio::fs::read_to_string(&self.batch).await?;
        let batch = Batch::from_json(&raw)?;
        tracing::debug!(
            "Loaded {}: {} declarations, {} units",
            self.batch.display(),
            batch.declarations.len(),
            batch.units.len()
        );
        Ok(batch)
    }
}

/// CLI subcommands for warden.
#[derive(Subcommand)]
pub enum Cmd {
    /// Check a batch and print its diagnostics.
    Check(check::CheckArgs),
    /// Print the resolved qualifier table and lowered signatures.
    Table(table::TableArgs),
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Check(args) => args.execute().await,
            Cmd::Table(args) => args.execute().await,
        }
    }
}
