//! `verger` -- orchard administration console.
//!
//! Lists, searches and edits the backend's reference collections
//! (rootstocks, protocols, orchards, plots, producers, producer types and
//! certification bodies).
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                     | Description                     |
//! |-----------------------|----------|-----------------------------|---------------------------------|
//! | `VERGER_API_URL`      | no       | `http://localhost:8080/api` | Base URL of the collections API |
//! | `VERGER_TIMEOUT_SECS` | no       | `30`                        | Per-request timeout             |
//! | `VERGER_API_TOKEN`    | no       | --                          | Bearer token sent with requests |
//! | `VERGER_PAGE_SIZE`    | no       | `10`                        | Default rows per page           |
//! | `RUST_LOG`            | no       | `verger=info`               | Log filter                      |

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verger_console::cli::Cli;
use verger_console::commands::{self, Output};
use verger_console::config::ConsoleConfig;
use verger_console::error::ConsoleError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            if let Some(errors) = e.field_errors() {
                for (field, message) in errors {
                    eprintln!("  {field}: {message}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<String, ConsoleError> {
    let config = ConsoleConfig::from_env()?.with_api_url(cli.api_url.as_deref());
    tracing::debug!(base_url = %config.client.base_url, "Configuration loaded");

    let backend = commands::connect(&config)?;
    let output = if cli.json { Output::Json } else { Output::Text };
    commands::execute(&cli.command, &config, backend, output).await
}
