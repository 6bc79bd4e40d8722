//! IPv4 address sets: CIDR collapse and complement.
//!
//! Every operation works on half-open `u64` ranges so that the end of the
//! address space (`255.255.255.255` + 1) is representable and nothing ever
//! wraps back to `0.0.0.0`.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// One past the last IPv4 address.
const SPACE_END: u64 = 1 << 32;

/// Half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u64,
    end: u64,
}

impl Span {
    fn of(net: &Ipv4Net) -> Self {
        let start = u64::from(u32::from(net.network()));
        Self {
            start,
            end: start + (1u64 << (32 - net.prefix_len())),
        }
    }

    /// Append the fewest CIDR blocks whose union is exactly this span.
    ///
    /// Greedy: at each step take the largest block that is both aligned on
    /// `start` and does not run past `end`.
    fn summarize_into(self, out: &mut Vec<Ipv4Net>) {
        assert!(
            self.start <= self.end && self.end <= SPACE_END,
            "span {:?} outside the IPv4 space",
            self
        );

        let mut start = self.start;
        while start < self.end {
            let align = if start == 0 {
                32
            } else {
                start.trailing_zeros().min(32)
            };
            let remaining = self.end - start;
            // floor(log2(remaining)), remaining >= 1
            let fit = 63 - remaining.leading_zeros();
            let host_bits = align.min(fit);

            out.push(block(start, host_bits));
            start += 1u64 << host_bits;
        }
    }
}

fn block(start: u64, host_bits: u32) -> Ipv4Net {
    let addr = Ipv4Addr::from(start as u32);
    match Ipv4Net::new(addr, (32 - host_bits) as u8) {
        Ok(net) => net,
        Err(_) => unreachable!("host bits never exceed 32"),
    }
}

/// Sort and merge overlapping or adjacent spans.
fn merge<I>(blocks: I) -> Vec<Span>
where
    I: IntoIterator<Item = Ipv4Net>,
{
    let mut spans: Vec<Span> = blocks.into_iter().map(|n| Span::of(&n)).collect();
    spans.sort_unstable_by_key(|s| s.start);

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// A sorted, non-overlapping, minimal set of IPv4 CIDR blocks.
///
/// Values are only built through [`AddressSet::collapse`] or
/// [`AddressSet::complement`], so the invariants hold for every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    blocks: Vec<Ipv4Net>,
}

impl AddressSet {
    /// Minimal CIDR cover of the union of `blocks`.
    ///
    /// Input may be unordered and overlapping. Output is ascending.
    ///
    /// # Examples
    /// ```
    /// use birdroutes::address_set::AddressSet;
    /// let set = AddressSet::collapse(vec![
    ///     "1.0.0.0/24".parse().unwrap(),
    ///     "1.0.1.0/24".parse().unwrap(),
    /// ]);
    /// assert_eq!(set.to_string(), "1.0.0.0/23");
    /// ```
    pub fn collapse<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = Ipv4Net>,
    {
        let mut out = Vec::new();
        for span in merge(blocks) {
            span.summarize_into(&mut out);
        }
        Self { blocks: out }
    }

    /// Every address not covered by `blocks ∪ excluded`, ascending.
    ///
    /// Leading, interior and trailing gaps are each summarized with the
    /// same primitive [`AddressSet::collapse`] uses, so the result is minimal
    /// per gap.
    pub fn complement<I, J>(blocks: I, excluded: J) -> Self
    where
        I: IntoIterator<Item = Ipv4Net>,
        J: IntoIterator<Item = Ipv4Net>,
    {
        let covered = merge(blocks.into_iter().chain(excluded));

        let mut out = Vec::new();
        let mut cursor = 0u64;
        for span in covered {
            if cursor < span.start {
                Span {
                    start: cursor,
                    end: span.start,
                }
                .summarize_into(&mut out);
            }
            cursor = cursor.max(span.end);
        }
        if cursor < SPACE_END {
            Span {
                start: cursor,
                end: SPACE_END,
            }
            .summarize_into(&mut out);
        }

        let set = Self { blocks: out };
        debug_assert!(set.is_disjoint_sorted());
        set
    }

    /// Everything outside this set.
    pub fn inverse(&self) -> Self {
        Self::complement(self.blocks.iter().copied(), std::iter::empty())
    }

    pub fn blocks(&self) -> &[Ipv4Net] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Ipv4Net> {
        self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ipv4Net> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of individual addresses covered. `0.0.0.0/0` counts 2^32.
    pub fn address_count(&self) -> u64 {
        self.blocks
            .iter()
            .map(|b| 1u64 << (32 - b.prefix_len()))
            .sum()
    }

    /// Check whether `addr` falls inside any block.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let idx = self.blocks.partition_point(|b| b.network() <= addr);
        idx > 0 && self.blocks[idx - 1].contains(&addr)
    }

    fn is_disjoint_sorted(&self) -> bool {
        self.blocks
            .windows(2)
            .all(|w| Span::of(&w[0]).end <= Span::of(&w[1]).start)
    }
}

impl FromIterator<Ipv4Net> for AddressSet {
    fn from_iter<T: IntoIterator<Item = Ipv4Net>>(iter: T) -> Self {
        Self::collapse(iter)
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a Ipv4Net;
    type IntoIter = std::slice::Iter<'a, Ipv4Net>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl std::fmt::Display for AddressSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nets(list: &[&str]) -> Vec<Ipv4Net> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn strings(set: &AddressSet) -> Vec<String> {
        set.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_collapse_adjacent() {
        let set = AddressSet::collapse(nets(&["1.0.0.0/24", "1.0.1.0/24"]));
        assert_eq!(strings(&set), vec!["1.0.0.0/23"]);
    }

    #[test]
    fn test_collapse_overlapping_and_unordered() {
        let set = AddressSet::collapse(nets(&[
            "192.168.0.128/25",
            "10.0.0.0/8",
            "192.168.0.0/24",
            "10.1.0.0/16",
        ]));
        assert_eq!(strings(&set), vec!["10.0.0.0/8", "192.168.0.0/24"]);
    }

    #[test]
    fn test_collapse_duplicates() {
        let set = AddressSet::collapse(nets(&["8.8.8.0/24", "8.8.8.0/24"]));
        assert_eq!(strings(&set), vec!["8.8.8.0/24"]);
    }

    #[test]
    fn test_collapse_unaligned_range_splits() {
        // 1.0.1.0 - 1.0.3.255 is not a single power-of-two block
        let set = AddressSet::collapse(nets(&["1.0.1.0/24", "1.0.2.0/23"]));
        assert_eq!(strings(&set), vec!["1.0.1.0/24", "1.0.2.0/23"]);
    }

    #[test]
    fn test_collapse_empty() {
        let set = AddressSet::collapse(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.address_count(), 0);
    }

    #[test]
    fn test_collapse_whole_space() {
        let set = AddressSet::collapse(nets(&["0.0.0.0/1", "128.0.0.0/1"]));
        assert_eq!(strings(&set), vec!["0.0.0.0/0"]);
        assert_eq!(set.address_count(), 1u64 << 32);
    }

    #[test]
    fn test_collapse_top_of_space() {
        let set = AddressSet::collapse(nets(&["255.255.255.254/32", "255.255.255.255/32"]));
        assert_eq!(strings(&set), vec!["255.255.255.254/31"]);
    }

    #[test]
    fn test_complement_of_nothing_is_everything() {
        let set = AddressSet::complement(Vec::new(), Vec::new());
        assert_eq!(strings(&set), vec!["0.0.0.0/0"]);
    }

    #[test]
    fn test_complement_of_everything_is_empty() {
        let set = AddressSet::complement(nets(&["0.0.0.0/0"]), Vec::new());
        assert!(set.is_empty());
    }

    #[test]
    fn test_complement_lower_half() {
        let set = AddressSet::complement(nets(&["0.0.0.0/1"]), Vec::new());
        assert_eq!(strings(&set), vec!["128.0.0.0/1"]);
    }

    #[test]
    fn test_complement_leading_and_trailing_gaps() {
        let set = AddressSet::complement(nets(&["64.0.0.0/2"]), Vec::new());
        assert_eq!(strings(&set), vec!["0.0.0.0/2", "128.0.0.0/1"]);
    }

    #[test]
    fn test_complement_last_block_ends_at_top() {
        let set = AddressSet::complement(nets(&["255.255.255.255/32"]), Vec::new());
        let blocks = strings(&set);
        assert_eq!(blocks.first().unwrap(), "0.0.0.0/1");
        assert_eq!(blocks.last().unwrap(), "255.255.255.254/32");
        assert_eq!(set.address_count(), (1u64 << 32) - 1);
        assert!(!set.contains(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_complement_excludes_both_inputs() {
        let set = AddressSet::complement(nets(&["1.0.0.0/8"]), nets(&["2.0.0.0/8"]));
        assert!(!set.contains(Ipv4Addr::new(1, 2, 3, 4)));
        assert!(!set.contains(Ipv4Addr::new(2, 2, 3, 4)));
        assert!(set.contains(Ipv4Addr::new(3, 0, 0, 0)));
        assert!(set.contains(Ipv4Addr::new(0, 255, 255, 255)));
    }

    #[test]
    fn test_complement_overlapping_exclusions() {
        let set = AddressSet::complement(
            nets(&["10.0.0.0/8", "10.1.0.0/16"]),
            nets(&["10.0.0.0/7"]),
        );
        assert!(!set.contains(Ipv4Addr::new(11, 0, 0, 1)));
        assert_eq!(set.address_count(), (1u64 << 32) - (1u64 << 25));
    }

    #[test]
    fn test_inverse() {
        let set = AddressSet::collapse(nets(&["128.0.0.0/1"]));
        assert_eq!(strings(&set.inverse()), vec!["0.0.0.0/1"]);
    }

    #[test]
    fn test_contains() {
        let set = AddressSet::collapse(nets(&["1.0.0.0/24", "5.5.0.0/16"]));
        assert!(set.contains(Ipv4Addr::new(1, 0, 0, 0)));
        assert!(set.contains(Ipv4Addr::new(1, 0, 0, 255)));
        assert!(!set.contains(Ipv4Addr::new(1, 0, 1, 0)));
        assert!(set.contains(Ipv4Addr::new(5, 5, 200, 1)));
        assert!(!set.contains(Ipv4Addr::new(0, 0, 0, 0)));
        assert!(!set.contains(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_from_iterator_collapses() {
        let set: AddressSet = nets(&["1.0.0.0/25", "1.0.0.128/25"]).into_iter().collect();
        assert_eq!(strings(&set), vec!["1.0.0.0/24"]);
    }

    #[test]
    fn test_display() {
        let set = AddressSet::collapse(nets(&["1.0.0.0/24", "3.0.0.0/8"]));
        assert_eq!(set.to_string(), "1.0.0.0/24 3.0.0.0/8");
    }

    #[test]
    fn test_summarize_single_address_range() {
        let mut out = Vec::new();
        Span { start: 5, end: 6 }.summarize_into(&mut out);
        assert_eq!(out, nets(&["0.0.0.5/32"]));
    }

    #[test]
    fn test_summarize_empty_span() {
        let mut out = Vec::new();
        Span { start: 7, end: 7 }.summarize_into(&mut out);
        assert!(out.is_empty());
    }
}
