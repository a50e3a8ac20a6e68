use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::configuration::DEFAULT_CONFIGURATION_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "socksbridge",
    about = "Opens authenticated SOCKS5 tunnels into private networks.",
    version,
    long_about = None
)]
pub struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIGURATION_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve all configured local forwards.
    Forward {
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Open one tunnel, send a test message and report the result.
    Probe {
        #[arg(long)]
        routing_id: String,
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: u16,
        /// Connect timeout in seconds, defaults to the configured one.
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Validate the configuration file.
    Check,
}

pub fn parse_command() -> (PathBuf, Commands) {
    let args = Cli::parse();

    let command = args.command.unwrap_or(Commands::Forward {
        #[cfg(debug_assertions)]
        verbose: true,
        #[cfg(not(debug_assertions))]
        verbose: false,
    });

    (args.config, command)
}
