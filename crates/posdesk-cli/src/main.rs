//! posdesk - a terminal client for the point-of-sale admin API.
//!
//! Each invocation restores the saved session, opens the screen the command
//! belongs to, and lets the route guard decide whether a login comes first.

mod commands;
mod output;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use posdesk_core::{App, Config};

use commands::Command;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=posdesk_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = Config::load()?;
    let mut app = App::new(config)?;
    info!(authenticated = app.is_authenticated(), "posdesk starting");

    if let Err(e) = commands::run(&mut app, command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
