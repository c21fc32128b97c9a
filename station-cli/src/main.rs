//! station - Digital Police Station command-line client
//!
//! Signs citizens, police officers and government officials in against the
//! station backend and renders their dashboards in the terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Sign in as an officer
//! station login --role police --station-id 9 --member-id 77 --password ...
//!
//! # Show the dashboard for whoever is signed in
//! station dashboard
//!
//! # File a FIR through the three-step wizard
//! station fir file --fullname "Charlie Test" --age 28 ...
//! ```

mod cli;
mod commands;
mod prompt;

use clap::Parser;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use station_client::{ClientConfig, FileStore, GatewayClient, RouteService, SessionStore};

use cli::Cli;
use commands::{execute_command, Context};
use prompt::TerminalPrompter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("station_client={}", level).parse()?)
                .add_directive(format!("station={}", level).parse()?),
        )
        .init();

    let mut config = ClientConfig::load(&cli.config)?;

    // Override config with CLI args
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }
    if let Some(session_file) = cli.session_file {
        config.session.path = Some(session_file);
    }

    let session_path = config.session_path();
    debug!(
        "Backend {} with session file {}",
        config.api.base_url,
        session_path.display()
    );

    let session = SessionStore::new(Arc::new(FileStore::new(session_path)));
    let gateway = GatewayClient::new(&config.api, session)?;
    let prompter = Arc::new(TerminalPrompter::new(cli.yes));
    let ctx = Context::new(RouteService::new(gateway), prompter.clone());

    match execute_command(&ctx, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            // Dashboard actions already alerted the failure
            if !prompter.alerted() {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        }
    }
}
