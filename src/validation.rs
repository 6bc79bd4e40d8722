//! Centralized validation functions for birdroutes.
//!
//! This module provides unified validation for:
//! - Interface names written into route statements
//! - Remote URLs (HTTPS only)

use anyhow::{bail, Result};

/// Linux IFNAMSIZ minus the trailing NUL
pub const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Validate an interface name before it is quoted into a route statement.
///
/// Only ASCII alphanumerics and `._-@:` are accepted, so a name can never
/// close the quoted string or start a new statement.
///
/// # Examples
/// ```
/// use birdroutes::validation::validate_interface_name;
/// assert!(validate_interface_name("eth0").is_ok());
/// assert!(validate_interface_name("wg-home.10").is_ok());
/// assert!(validate_interface_name("eth0\"; route").is_err());
/// assert!(validate_interface_name("").is_err());
/// ```
pub fn validate_interface_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Interface name must not be empty");
    }
    if name.len() > MAX_INTERFACE_NAME_LEN {
        bail!(
            "Interface name '{}' is longer than {} characters",
            name,
            MAX_INTERFACE_NAME_LEN
        );
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._-@:".contains(c))
    {
        bail!("Interface name '{}' contains invalid characters", name);
    }
    Ok(())
}

/// Check that a URL uses HTTPS and has a host part.
pub fn is_https_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .map(|rest| !rest.is_empty() && !rest.starts_with('/'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_interface_names() {
        for name in ["eth0", "wg0", "enp3s0", "br-lan", "eth0.100", "veth_a", "ppp0@x"] {
            assert!(validate_interface_name(name).is_ok(), "rejected {}", name);
        }
    }

    #[test]
    fn test_invalid_interface_names() {
        for name in ["", "eth 0", "eth0\"", "eth0;", "eth0\n", "ethé", "abcdefghijklmnop"] {
            assert!(validate_interface_name(name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn test_interface_name_max_len() {
        assert!(validate_interface_name(&"a".repeat(MAX_INTERFACE_NAME_LEN)).is_ok());
        assert!(validate_interface_name(&"a".repeat(MAX_INTERFACE_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_is_https_url() {
        assert!(is_https_url("https://example.com/list.txt"));
        assert!(is_https_url("https://raw.githubusercontent.com/a/b"));
        assert!(!is_https_url("http://example.com"));
        assert!(!is_https_url("https://"));
        assert!(!is_https_url("https:///path"));
        assert!(!is_https_url("ftp://example.com"));
        assert!(!is_https_url(""));
    }
}
