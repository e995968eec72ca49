use super::{BatchArgs, CliError};
use async_trait::async_trait;
use clap::Args;
use serde_json::json;
use std::error::Error;
use warden_checker::Checker;

/// Arguments for the `table` subcommand.
#[derive(Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub input: BatchArgs,
}

/// Resolves declarations only and dumps the qualifier table, including the lowered signature of
/// every `auth` function and the declarations that were rejected.
#[async_trait]
impl super::Command for TableArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let config = self.input.config()?;
        let batch = self.input.load_batch().await?;
        let checker = Checker::new(&batch.declarations, config);

        let output = json!({
            "table": checker.table(),
            "diagnostics": checker.declaration_diagnostics(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).map_err(CliError::from)?
        );
        Ok(())
    }
}
