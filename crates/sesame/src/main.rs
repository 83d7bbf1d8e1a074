// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sesame - pluggable authentication drivers.
//!
//! This is the binary entry point. It loads configuration, builds the enabled
//! drivers, and exposes them through a few inspection commands.

mod commands;
mod drivers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sesame_config::model::SesameConfig;
use sesame_core::{AuthError, ProviderType, SigninConsumerToken};

/// Sesame - pluggable authentication drivers.
#[derive(Parser, Debug)]
#[command(name = "sesame", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the manifests of the enabled drivers as JSON.
    Drivers,
    /// Mint a signin redirect for a provider.
    SigninUrl {
        /// Provider type (github, gitlab, oidc).
        provider: ProviderType,
        /// Client that initiated the signin.
        #[arg(long, default_value = "cli")]
        origin: String,
        /// Where to send the browser after signin.
        #[arg(long, default_value = "")]
        redirect_uri: String,
    },
    /// Validate the configuration and list enabled providers.
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => sesame_config::load_and_validate_path(path),
        None => sesame_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            sesame_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.server.log_level);

    match run(cli.command, &config).await {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("sesame: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &SesameConfig) -> Result<String, AuthError> {
    match command {
        Commands::CheckConfig => Ok(commands::config_summary(config)),
        Commands::Drivers => {
            let drivers = drivers::build_drivers(config).await?;
            commands::drivers_json(&drivers).map(|json| json + "\n")
        }
        Commands::SigninUrl {
            provider,
            origin,
            redirect_uri,
        } => {
            let drivers = drivers::build_drivers(config).await?;
            let token = SigninConsumerToken {
                origin,
                redirect_uri,
                ..Default::default()
            };
            commands::signin_url(&drivers, provider, &token).map(|json| json + "\n")
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sesame={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
