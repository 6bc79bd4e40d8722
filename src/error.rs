//! Error types for birdroutes.

use ipnet::Ipv4Net;
use thiserror::Error;

/// Why a single line of the prefix list was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid IPv4 CIDR: {0}")]
    InvalidCidr(String),

    #[error("Host bits set in {0} (network is {1})")]
    HostBitsSet(String, Ipv4Net),
}

/// A run step that failed outside the route computation.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Download failed: {0}")]
    Fetch(String),

    #[error("No usable prefixes in the downloaded list")]
    EmptyPrefixList,

    #[error("Failed to write route file: {0}")]
    Write(String),

    #[error("Router reload failed: {0}")]
    Reload(String),
}
