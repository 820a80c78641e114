//! CLI interface for DRCS.

mod commands;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;
pub use utils::*;

#[derive(Parser)]
#[command(name = "drcs")]
#[command(about = "Disaster response coordination server for government and NGO portals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file path (TOML)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the JSON-RPC API
    Serve {
        /// "stdio" or "socket"; defaults to the configured transport
        #[arg(long, short = 't')]
        transport: Option<String>,

        /// Unix socket path (used when transport = "socket")
        #[arg(long, short = 's')]
        socket_path: Option<String>,
    },

    /// Initialize default configuration at default location
    Init {
        #[arg(long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[arg(long)]
        show: bool,

        #[arg(long)]
        validate: bool,
    },

    /// Show version information
    Version,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Level for the log filter: the flag, else the configured level
    pub fn log_level(&self) -> Option<String> {
        effective_log_level(self.log_level.as_deref(), self.config.as_deref())
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { transport, socket_path } => serve(self.config, transport, socket_path).await,
            Commands::Init { force } => init(force).await,
            Commands::Config { show, validate } => config(self.config, show, validate).await,
            Commands::Version => version().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["drcs", "--log-level", "debug", "serve", "-t", "socket", "-s", "/tmp/d.sock"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Serve { transport, socket_path } => {
                assert_eq!(transport.as_deref(), Some("socket"));
                assert_eq!(socket_path.as_deref(), Some("/tmp/d.sock"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["drcs", "config", "--show", "--config", "/tmp/drcs.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/drcs.toml")));
        assert!(matches!(cli.command, Commands::Config { show: true, validate: false }));
    }
}
