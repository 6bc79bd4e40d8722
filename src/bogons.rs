//! Reserved and ignored IPv4 space that never becomes a route.
//!
//! Both tables are fixed at compile time. Callers normally want the union
//! of the two, which [`excluded`] yields.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Blocks that are always dropped, in both route directions.
pub static IGNORED: &[(Ipv4Addr, u8)] = &[(Ipv4Addr::new(0, 0, 0, 0), 8)];

/// Special-purpose and non-routable ranges (RFC 1122, 1918, 3927, 5737, 6598, 6890...).
pub static RESERVED: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 0, 0, 0), 29),
    (Ipv4Addr::new(192, 0, 0, 170), 31),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
];

fn table(entries: &'static [(Ipv4Addr, u8)]) -> impl Iterator<Item = Ipv4Net> + Clone {
    entries
        .iter()
        .filter_map(|&(addr, len)| Ipv4Net::new(addr, len).ok())
}

/// The ignored table as networks.
pub fn ignored() -> impl Iterator<Item = Ipv4Net> + Clone {
    table(IGNORED)
}

/// The reserved table as networks.
pub fn reserved() -> impl Iterator<Item = Ipv4Net> + Clone {
    table(RESERVED)
}

/// Ignored ∪ reserved. Duplicates are harmless: every consumer collapses
/// or tests containment.
pub fn excluded() -> impl Iterator<Item = Ipv4Net> + Clone {
    ignored().chain(reserved())
}

/// Check whether `net` lies entirely inside an ignored or reserved block.
///
/// Partial overlaps are not excluded: `10.0.0.0/7` is kept even though its
/// lower half is RFC 1918 space.
pub fn is_excluded(net: &Ipv4Net) -> bool {
    excluded().any(|bogon| bogon.contains(net))
}
