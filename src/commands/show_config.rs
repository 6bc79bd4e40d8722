//! Config command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::commands::load_or_default;
use crate::config::{Config, SecureString};

const REDACTED: &str = "[REDACTED]";

fn redact(secret: &mut SecureString) {
    if !secret.is_empty() {
        *secret = SecureString::from(REDACTED);
    }
}

/// Copy of `config` with tokens, passwords and webhook header values masked.
pub fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    redact(&mut config.alerts.telegram.bot_token);
    redact(&mut config.alerts.gotify.token);
    redact(&mut config.alerts.email.smtp_password);
    for value in config.alerts.webhook.headers.values_mut() {
        *value = REDACTED.to_string();
    }
    config
}

/// Effective configuration as YAML, secrets masked.
pub fn render(config: &Config) -> Result<String> {
    serde_yaml::to_string(&redacted(config)).context("Failed to serialize config")
}

/// Run the config command
pub fn run(default: bool, config_path: &Path) -> Result<()> {
    if default {
        print!("{}", Config::generate_default_yaml());
        return Ok(());
    }

    let config = load_or_default(config_path)?;
    print!("{}", render(&config)?);
    Ok(())
}
