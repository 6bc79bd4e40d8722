//! Prefix list parsing.
//!
//! Input is the chnroutes-style text format: one IPv4 prefix per line, `#`
//! comments, blank lines allowed. Bad lines are reported and skipped; they
//! never abort a run.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

use crate::bogons;
use crate::error::PrefixError;

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    /// 1-based line number in the source text
    pub line_number: usize,
    pub content: String,
    pub error: PrefixError,
}

/// Result of parsing a prefix list.
#[derive(Debug, Clone, Default)]
pub struct ParsedPrefixes {
    /// Accepted networks, in input order
    pub networks: Vec<Ipv4Net>,
    /// Lines that were not valid prefixes
    pub invalid: Vec<InvalidLine>,
    /// Valid prefixes dropped because they sit inside reserved/ignored space
    pub excluded: usize,
    /// Non-blank, non-comment lines examined
    pub candidates: usize,
}

/// Parse one prefix: `a.b.c.d/n`, or a bare address taken as `/32`.
///
/// Parsing is strict: a CIDR whose address has bits set beyond the prefix
/// length is rejected rather than silently truncated.
///
/// # Examples
/// ```
/// use birdroutes::parser::parse_prefix;
/// assert_eq!(parse_prefix("1.0.0.0/24").unwrap().to_string(), "1.0.0.0/24");
/// assert_eq!(parse_prefix("1.2.3.4").unwrap().to_string(), "1.2.3.4/32");
/// assert!(parse_prefix("1.2.3.4/24").is_err());
/// assert!(parse_prefix("not-an-ip").is_err());
/// ```
pub fn parse_prefix(s: &str) -> Result<Ipv4Net, PrefixError> {
    if s.contains('/') {
        let net: Ipv4Net = s
            .parse()
            .map_err(|_| PrefixError::InvalidCidr(s.to_string()))?;
        let network = net.trunc();
        if network != net {
            return Err(PrefixError::HostBitsSet(s.to_string(), network));
        }
        Ok(net)
    } else {
        let addr: Ipv4Addr = s
            .parse()
            .map_err(|_| PrefixError::InvalidAddress(s.to_string()))?;
        Ok(Ipv4Net::from(addr))
    }
}

/// Parse a whole prefix list, dropping malformed lines and bogon space.
pub fn parse_prefix_list(content: &str) -> ParsedPrefixes {
    let mut parsed = ParsedPrefixes::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        parsed.candidates += 1;

        match parse_prefix(line) {
            Ok(net) if bogons::is_excluded(&net) => {
                debug!("Dropping reserved prefix {}", net);
                parsed.excluded += 1;
            }
            Ok(net) => parsed.networks.push(net),
            Err(error) => {
                warn!("Invalid entry skipped (line {}): {}", idx + 1, error);
                parsed.invalid.push(InvalidLine {
                    line_number: idx + 1,
                    content: line.to_string(),
                    error,
                });
            }
        }
    }

    parsed
}
