use clap::Parser;
use warden_cli::commands::{Cmd, Command};

/// Warden CLI
///
/// Warden checks the authorization rules of a batch of contract declarations and compilation
/// units: `auth` qualifiers, authorized imports, and the hidden authorization token every call
/// to an `auth` function receives.
#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden: authorization checker for contract access qualifiers")]
struct Cli {
    /// Increase log output (-v warnings, -vv info, -vvv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the warden CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .init();

    cli.command.execute().await
}
