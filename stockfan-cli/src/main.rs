//! stockfan CLI - command-line interface
//!
//! Looks up stock for a product code across every configured inventory
//! source, manages the source list and config file, and runs the HTTP form.

mod commands;
mod error;
mod runner;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use stockfan::config::config_file_path;

use commands::config::ConfigCommands;
use commands::lookup::LookupArgs;
use commands::sources::SourcesAction;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "stockfan")]
#[command(version = stockfan::VERSION)]
#[command(about = "Look up stock for a product code across every inventory source", long_about = None)]
struct Cli {
    /// Config file (default: ~/.stockfan/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a product code in every source
    Lookup {
        /// Product code to search for
        code: String,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,

        /// Match the code exactly instead of as a substring
        #[arg(long)]
        exact: bool,

        /// Print cache and source statistics afterwards
        #[arg(long)]
        stats: bool,
    },

    /// List or edit configured sources
    Sources {
        #[command(subcommand)]
        action: Option<SourcesAction>,
    },

    /// Serve the lookup form and JSON endpoint over HTTP
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Create or refresh the config file
    Init,

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }

    fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config_path();
    let log_level = cli.log_level();

    match cli.command {
        Commands::Lookup {
            code,
            json,
            exact,
            stats,
        } => {
            let runner = CliRunner::new(&config_path, log_level)?;
            commands::lookup::run(
                &runner,
                LookupArgs {
                    code,
                    json,
                    exact,
                    stats,
                },
            )
        }
        Commands::Serve { bind } => {
            let runner = CliRunner::new(&config_path, log_level)?;
            commands::serve::run(&runner, bind)
        }
        Commands::Sources { action } => commands::sources::run(&config_path, action),
        Commands::Init => commands::init::run(&config_path),
        Commands::Config { command } => commands::config::run(&config_path, command),
    }
}
