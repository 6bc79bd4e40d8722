//! Generate command implementation.
//!
//! Offline counterpart of `update`: reads a prefix list from a file or stdin
//! and renders routes without touching the network or the router.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::RouteOverrides;
use crate::commands::load_or_default;
use crate::config::Config;
use crate::routes::{plan_routes, RoutePlan};
use crate::sink::{FileSink, RouteSink, StdoutSink};
use crate::utils::format_count;

/// Render `content` and hand the result to `sink`.
pub fn execute(content: &str, config: &Config, sink: &dyn RouteSink) -> Result<RoutePlan> {
    let plan = plan_routes(content, &config.interface, config.mode());

    if !plan.parsed.invalid.is_empty() {
        warn!("Skipped {} malformed lines", plan.parsed.invalid.len());
    }
    info!(
        "{} prefixes -> {} {} routes",
        format_count(plan.parsed.networks.len() as u64),
        format_count(plan.routes.len() as u64),
        config.mode()
    );

    sink.write(&plan.rendered)
        .with_context(|| format!("Failed to write routes to {}", sink.describe()))?;
    Ok(plan)
}

/// Read the prefix list from `input`, or stdin for `None` / `-`.
fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prefix list {:?}", path)),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read prefix list from stdin")?;
            Ok(content)
        }
    }
}

/// Run the generate command
pub fn run(input: Option<&Path>, overrides: &RouteOverrides, config_path: &Path) -> Result<()> {
    let mut config = load_or_default(config_path)?;
    overrides.apply(&mut config)?;

    let content = read_input(input)?;

    // Only an explicit --output writes a file; the configured route file
    // belongs to `update`.
    match overrides.output {
        Some(_) => {
            let sink = FileSink::new(&config.output_file);
            execute(&content, &config, &sink)?;
            info!("Routes written to {}", sink.describe());
        }
        None => {
            execute(&content, &config, &StdoutSink)?;
        }
    }

    Ok(())
}
