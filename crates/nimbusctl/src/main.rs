use anyhow::Result;
use clap::Parser;
use tracing::{debug, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod connection;
mod error;
mod output;
mod prompt;
mod remote;

use cli::{Cli, Commands};
use config::Config;
use connection::ConnectionManager;
use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration from the specified path or the default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let mut conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &mut conn_mgr).await {
        if e.is_clean_stop() {
            eprintln!("{e}");
            return Ok(());
        }
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG takes precedence over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "nimbusctl=warn,nimbusctl_core=warn",
            1 => "nimbusctl=info,nimbusctl_core=info",
            2 => "nimbusctl=debug,nimbusctl_core=debug",
            _ => "nimbusctl=trace,nimbusctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &mut ConnectionManager) -> Result<(), CliError> {
    trace!("Executing command: {:?}", cli.command);
    let profile = cli.profile.as_deref();

    match &cli.command {
        Commands::Image(cmd) => {
            commands::image::handle(cmd.clone(), conn_mgr, profile, cli.output, cli.yes).await
        }
        Commands::Disk(cmd) => {
            commands::disk::handle(cmd.clone(), conn_mgr, profile, cli.output, cli.yes).await
        }
        Commands::Addon(cmd) => {
            commands::addon::handle(cmd.clone(), conn_mgr, profile, cli.output, cli.yes).await
        }
        Commands::Operation(cmd) => {
            commands::operation::handle(cmd.clone(), conn_mgr, profile, cli.output).await
        }
        Commands::Profile(cmd) => {
            commands::profile::handle(cmd.clone(), conn_mgr, cli.output).await
        }
        Commands::Version => {
            match cli.output {
                output::OutputFormat::Json | output::OutputFormat::Yaml => {
                    output::print_output(
                        serde_json::json!({
                            "name": env!("CARGO_PKG_NAME"),
                            "version": env!("CARGO_PKG_VERSION"),
                        }),
                        cli.output,
                    )?;
                }
                _ => {
                    println!("nimbusctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }
    }
}
