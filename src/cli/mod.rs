//! # Command Line Interface
//!
//! Runs the environment bootstrap, stops the sandbox, sends single requests
//! through the HTTP fixture and runs scenario suites outside `cargo test`.

pub mod output;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::client::SandboxClient;
use crate::config::{AppConfig, ProbeKind};
use crate::observability::{init_logging, log_config_info};
use crate::scenarios::{run_suite, Suite};
use crate::{bootstrap, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "authentik-e2e")]
#[command(about = "End-to-end checks for the Traefik + Authentik forward-auth sandbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./authentik-e2e.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local routing address override, e.g. 127.0.0.1:8000
    #[arg(long, global = true)]
    pub routing_address: Option<SocketAddr>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the sandbox and wait until every health endpoint answers 200
    Bootstrap {
        /// Only wait for health; the sandbox is started elsewhere
        #[arg(long)]
        skip_compose: bool,

        /// Health prober
        #[arg(long, value_enum)]
        probe: Option<ProbeKind>,
    },

    /// Stop the sandbox
    Teardown,

    /// Send one GET through the HTTP fixture and print the raw response
    Probe {
        /// Virtual URL, e.g. http://whoami.localhost/login
        url: String,
    },

    /// Run scenario suites against a running sandbox
    Run {
        #[arg(long, value_enum, default_value_t = Suite::All)]
        suite: Suite,

        /// Bootstrap the sandbox first
        #[arg(long)]
        bootstrap: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(address) = cli.routing_address {
        config.sandbox.routing_address = address;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting sandbox suite");
    log_config_info(&config);

    match cli.command {
        Commands::Bootstrap { skip_compose, probe } => {
            if skip_compose {
                config.bootstrap.compose = false;
            }
            if let Some(probe) = probe {
                config.bootstrap.probe = probe;
            }
            bootstrap::bootstrap(&config).await?;
            println!("✅ Sandbox is ready");
        }

        Commands::Teardown => {
            bootstrap::teardown(&config).await?;
            println!("Sandbox stopped");
        }

        Commands::Probe { url } => {
            let client = SandboxClient::from_config(&config)?;
            let response = client.get(&url).await?;
            output::print_response(&response);
        }

        Commands::Run { suite, bootstrap: start_sandbox, json } => {
            if start_sandbox {
                bootstrap::bootstrap(&config).await?;
            }
            let report = run_suite(&config, suite).await?;

            if json {
                output::print_json(&report)?;
            } else {
                output::print_report(&report);
            }

            if !report.is_success() {
                anyhow::bail!("{} scenario(s) failed, {} skipped", report.failed(), report.skipped());
            }
        }
    }

    Ok(())
}
