//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "birdroutes")]
#[command(author, version, about = "Country prefix list to BIRD static routes")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the prefix list, write routes and reload BIRD
    Update {
        #[command(flatten)]
        overrides: RouteOverrides,

        /// Fetch and generate, print routes to stdout, write and reload nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate routes from a local prefix list (no network, no reload)
    Generate {
        /// Prefix list file ('-' or omitted for stdin)
        #[arg(long, short)]
        input: Option<PathBuf>,

        #[command(flatten)]
        overrides: RouteOverrides,
    },

    /// Print the effective configuration
    Config {
        /// Print the commented default configuration instead
        #[arg(long)]
        default: bool,
    },

    /// Check whether an address or CIDR is routed by the current route file
    Check {
        /// IPv4 address or CIDR
        target: String,

        /// Route file to inspect (defaults to output_file from config)
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Per-run overrides of config values.
#[derive(Args, Debug, Clone, Default)]
pub struct RouteOverrides {
    /// Egress interface for the routes
    #[arg(long)]
    pub interface: Option<String>,

    /// Route everything except the listed prefixes
    #[arg(long, conflicts_with = "direct")]
    pub reverse: bool,

    /// Route the listed prefixes (overrides `reverse: true` in config)
    #[arg(long)]
    pub direct: bool,

    /// Route file to write
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Do not reload BIRD after writing
    #[arg(long)]
    pub no_reload: bool,
}
