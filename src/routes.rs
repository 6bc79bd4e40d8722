//! Route generation: choose which blocks become routes.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::address_set::AddressSet;
use crate::bogons;
use crate::parser::{parse_prefix_list, ParsedPrefixes};
use crate::render::render_routes;

/// Which side of the prefix list gets routed through the interface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Route the listed prefixes themselves
    #[default]
    Direct,
    /// Route everything else (foreign routes), minus reserved space
    Reverse,
}

impl RouteMode {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            RouteMode::Reverse
        } else {
            RouteMode::Direct
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, RouteMode::Reverse)
    }
}

impl std::fmt::Display for RouteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteMode::Direct => f.write_str("direct"),
            RouteMode::Reverse => f.write_str("reverse"),
        }
    }
}

/// Produce the blocks to emit as routes.
///
/// Direct mode collapses the input. Reverse mode returns the complement of
/// the input together with reserved and ignored space, ascending.
pub fn generate_routes(networks: &[Ipv4Net], mode: RouteMode) -> AddressSet {
    match mode {
        RouteMode::Direct => AddressSet::collapse(networks.iter().copied()),
        RouteMode::Reverse => AddressSet::complement(networks.iter().copied(), bogons::excluded()),
    }
}

/// Everything one pass of parse → generate → render produces.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub parsed: ParsedPrefixes,
    pub routes: AddressSet,
    pub rendered: String,
}

/// Run the whole pure pipeline over a prefix list.
pub fn plan_routes(content: &str, interface: &str, mode: RouteMode) -> RoutePlan {
    let parsed = parse_prefix_list(content);
    let routes = generate_routes(&parsed.networks, mode);
    let rendered = render_routes(&routes, interface);
    RoutePlan {
        parsed,
        routes,
        rendered,
    }
}
