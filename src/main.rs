//! birdroutes - Country prefix lists to BIRD static routes

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use birdroutes::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Logs go to stderr; stdout carries generated routes
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Update { overrides, dry_run } => {
            birdroutes::commands::update::run(&overrides, dry_run, &cli.config).await
        }
        Commands::Generate { input, overrides } => {
            birdroutes::commands::generate::run(input.as_deref(), &overrides, &cli.config)
        }
        Commands::Check { target, file } => {
            birdroutes::commands::check::run(&target, file.as_deref(), &cli.config)
        }
        Commands::Config { default } => birdroutes::commands::show_config::run(default, &cli.config),
        Commands::Version => {
            println!("birdroutes {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
