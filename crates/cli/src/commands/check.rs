//! Checks a batch and prints its diagnostics, either as text or as the full JSON report with
//! per-call annotations and the report digest.

use super::{BatchArgs, CliError};
use async_trait::async_trait;
use clap::Args;
use serde_json::json;
use std::error::Error;
use warden_checker::check_batch;

/// Arguments for the `check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: BatchArgs,
    /// Check units one after another instead of on parallel threads.
    #[arg(long)]
    pub sequential: bool,
    /// Print the JSON report instead of rendered diagnostics.
    #[arg(long)]
    pub json: bool,
}

#[async_trait]
impl super::Command for CheckArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut config = self.input.config()?;
        if self.sequential {
            config.parallel = false;
        }
        let batch = self.input.load_batch().await?;
        let report = check_batch(&batch, &config).map_err(CliError::from)?;

        if self.json {
            let output = json!({
                "accepted": report.is_accepted(),
                "digest": report.digest().map_err(CliError::from)?,
                "report": &report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for diagnostic in report.diagnostics() {
                println!("{diagnostic}");
            }
            println!(
                "checked {} units: {} diagnostic(s)",
                report.units.len(),
                report.diagnostic_count()
            );
        }

        if report.is_accepted() {
            Ok(())
        } else {
            Err(CliError::Rejected(report.diagnostic_count()).into())
        }
    }
}
