//! # Stockbook Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize tracing (stderr, RUST_LOG)                              │
//! │  2. Parse the command line (usage errors exit before touching the DB)  │
//! │  3. Load AppConfig from the environment                                │
//! │  4. Connect to the database & run migrations                           │
//! │  5. Execute; JSON result on stdout, ApiError JSON on stderr            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit codes: `0` success, `1` command failed, `2` usage error.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use stockbook_cli::{init_tracing, ApiError, App, AppConfig, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(());
            }
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print()?;
                std::process::exit(2);
            }
            _ => {
                report(&ApiError::from(err))?;
                eprintln!("Run `stockbook --help` for usage.");
                std::process::exit(2);
            }
        },
    };

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let app = App::connect(&config)
        .await
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;

    let outcome = app.execute(cli.command).await;
    app.close().await;

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            report(&err)?;
            std::process::exit(1);
        }
    }
}

fn report(err: &ApiError) -> anyhow::Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(err)?);
    Ok(())
}
