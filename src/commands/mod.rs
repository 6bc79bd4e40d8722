//! CLI command implementations.

pub mod check;
pub mod generate;
pub mod show_config;
pub mod update;

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::cli::RouteOverrides;
use crate::config::Config;

impl RouteOverrides {
    /// Apply command-line overrides and re-validate.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(ref interface) = self.interface {
            config.interface = interface.clone();
        }
        if self.reverse {
            config.reverse = true;
        }
        if self.direct {
            config.reverse = false;
        }
        if let Some(ref output) = self.output {
            config.output_file = output.clone();
        }
        if self.no_reload {
            config.reload.enabled = false;
        }
        config.validate()
    }
}

/// Load the config file, or fall back to defaults when it does not exist.
pub(crate) fn load_or_default(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        Config::load(config_path)
    } else {
        debug!("No config at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let overrides = RouteOverrides {
            interface: Some("wg0".to_string()),
            reverse: true,
            direct: false,
            output: Some(PathBuf::from("/tmp/routes.conf")),
            no_reload: true,
        };
        overrides.apply(&mut config).unwrap();
        assert_eq!(config.interface, "wg0");
        assert!(config.reverse);
        assert_eq!(config.output_file, PathBuf::from("/tmp/routes.conf"));
        assert!(!config.reload.enabled);
    }

    #[test]
    fn test_overrides_direct_clears_reverse() {
        let mut config = Config {
            reverse: true,
            ..Default::default()
        };
        let overrides = RouteOverrides {
            direct: true,
            ..Default::default()
        };
        overrides.apply(&mut config).unwrap();
        assert!(!config.reverse);
    }

    #[test]
    fn test_overrides_empty_is_noop() {
        let mut config = Config::default();
        RouteOverrides::default().apply(&mut config).unwrap();
        assert_eq!(config.interface, Config::default().interface);
        assert!(config.reload.enabled);
    }

    #[test]
    fn test_overrides_invalid_interface_rejected() {
        let mut config = Config::default();
        let overrides = RouteOverrides {
            interface: Some("eth0\";".to_string()),
            ..Default::default()
        };
        assert!(overrides.apply(&mut config).is_err());
    }

    #[test]
    fn test_load_or_default_missing() {
        let config = load_or_default(Path::new("/nonexistent/birdroutes.yaml")).unwrap();
        assert_eq!(config.interface, "eth0");
    }
}
