//! relprint: identify which release of a web application a site is running
//! by fingerprinting the static assets it serves.

mod commands;
mod error;

use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use relprint_config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::{ErrorKind, Result};

#[derive(Debug, Parser)]
#[command(name = "relprint", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "RELPRINT_CONFIG")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash unpacked release trees into listings
    Generate,
    /// Build the fingerprint database from listings
    #[command(visible_alias = "unique")]
    Build,
    /// Identify the release deployed at a URL
    Check {
        /// Base URL of the site, including scheme and trailing slash
        url: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Generate => commands::generate(&config),
        Command::Build => commands::build(&config),
        Command::Check { url } => {
            let identification = commands::check(&config, &url).await?;
            println!("{identification}");
            Ok(())
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_tracing(verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match verbose {
                0 => eprintln!("Error: {err}"),
                _ => eprintln!("Error: {err:?}"),
            }
            ExitCode::FAILURE
        },
    }
}
