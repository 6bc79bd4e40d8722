//! Check command implementation.

use anyhow::{Context, Result};
use ipnet::Ipv4Net;
use std::path::Path;

use crate::commands::load_or_default;
use crate::parser::parse_prefix;
use crate::render::parse_route_file;

/// How a queried block relates to the routes in a route file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    /// A single route contains the whole block
    Covered(Ipv4Net),
    /// Some routes overlap the block without containing it
    Partial(Vec<Ipv4Net>),
    NotCovered,
}

fn overlaps(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

/// Find how `target` is covered by `routes`.
pub fn coverage(routes: &[Ipv4Net], target: &Ipv4Net) -> Coverage {
    if let Some(route) = routes.iter().find(|r| r.contains(target)) {
        return Coverage::Covered(*route);
    }
    let partial: Vec<Ipv4Net> = routes
        .iter()
        .filter(|r| overlaps(r, target))
        .copied()
        .collect();
    if partial.is_empty() {
        Coverage::NotCovered
    } else {
        Coverage::Partial(partial)
    }
}

/// Run the check command
pub fn run(target: &str, file: Option<&Path>, config_path: &Path) -> Result<()> {
    let target_net = parse_prefix(target)?;

    let route_file = match file {
        Some(path) => path.to_path_buf(),
        None => load_or_default(config_path)?.output_file,
    };
    let content = std::fs::read_to_string(&route_file)
        .with_context(|| format!("Failed to read route file {:?}", route_file))?;
    let routes = parse_route_file(&content);

    println!();
    match coverage(&routes, &target_net) {
        Coverage::Covered(route) => {
            println!("{} is ROUTED (route {})", target, route);
        }
        Coverage::Partial(overlapping) => {
            println!("{} is PARTIALLY routed:", target);
            for route in overlapping {
                println!("  route {}", route);
            }
        }
        Coverage::NotCovered => {
            println!("{} is NOT routed", target);
        }
    }
    println!("({} routes in {})", routes.len(), route_file.display());
    println!();

    Ok(())
}
