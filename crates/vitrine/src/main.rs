//! Vitrine CLI - plugin catalog with compatibility resolution
//!
//! This is the main entry point for the Vitrine command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::List(args) => commands::list::run(args, config).await,
        Commands::Info(args) => commands::info::run(args, config).await,
        Commands::Install(args) => commands::install::install(args, config).await,
        Commands::Uninstall(args) => commands::install::uninstall(args, config).await,
        Commands::Verify(args) => commands::verify::run(args, config).await,
        Commands::Refresh => commands::refresh::run(config).await,
        Commands::History(args) => commands::history::run(args, config),
        Commands::Categories(args) => commands::categories::run(args, config).await,
        Commands::Config(command) => commands::config::run(command, config),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Soft failures are logged at warn; -v shows progress
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
