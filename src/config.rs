//! Configuration management for birdroutes.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::routes::RouteMode;
use crate::validation::{is_https_url, validate_interface_name};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/birdroutes/config.yaml";

/// Secure string type that zeroizes memory on drop
/// Used for sensitive data like tokens and passwords
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Look up a secret: custom env var, then default env var, then config value.
fn secret_from_env(custom: Option<&str>, default_var: &str, fallback: &SecureString) -> SecureString {
    if let Some(name) = custom {
        if let Ok(val) = env::var(name) {
            return SecureString::new(val);
        }
    }
    if let Ok(val) = env::var(default_var) {
        return SecureString::new(val);
    }
    fallback.clone()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the prefix list (one IPv4 CIDR per line)
    pub source_url: String,

    /// Egress interface written into every route
    pub interface: String,

    /// Emit the complement of the list instead of the list itself
    pub reverse: bool,

    /// Route file included by the BIRD configuration
    pub output_file: PathBuf,

    /// Router reload after a successful write
    pub reload: ReloadConfig,

    /// Alert destinations
    pub alerts: AlertsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url:
                "https://raw.githubusercontent.com/misakaio/chnroutes2/refs/heads/master/chnroutes.txt"
                    .to_string(),
            interface: "eth0".to_string(),
            reverse: false,
            output_file: PathBuf::from("/etc/bird/bird-chn-ip4.conf"),
            reload: ReloadConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !is_https_url(&self.source_url) {
            anyhow::bail!("Source URL must use HTTPS: {}", self.source_url);
        }

        validate_interface_name(&self.interface)?;

        if self.output_file.as_os_str().is_empty() {
            anyhow::bail!("output_file must not be empty");
        }

        if self.reload.enabled && self.reload.command.trim().is_empty() {
            anyhow::bail!("reload.command must not be empty when reload is enabled");
        }

        // Validate webhook URL uses HTTPS if enabled
        if self.alerts.webhook.enabled
            && !self.alerts.webhook.url.is_empty()
            && !is_https_url(&self.alerts.webhook.url)
        {
            anyhow::bail!("Webhook URL must use HTTPS: {}", self.alerts.webhook.url);
        }

        // Validate Gotify URL uses HTTPS if enabled
        if self.alerts.gotify.enabled
            && !self.alerts.gotify.url.is_empty()
            && !is_https_url(&self.alerts.gotify.url)
        {
            anyhow::bail!("Gotify URL must use HTTPS: {}", self.alerts.gotify.url);
        }

        if self.alerts.telegram.enabled && self.alerts.telegram.chat_id.trim().is_empty() {
            anyhow::bail!("Telegram alerts enabled but chat_id is empty");
        }

        Ok(())
    }

    /// Route direction selected by `reverse`
    pub fn mode(&self) -> RouteMode {
        RouteMode::from_reverse(self.reverse)
    }

    /// Lock file guarding concurrent writes to `output_file`
    pub fn lock_file(&self) -> PathBuf {
        let mut name = self.output_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub enabled: bool,
    /// Program to run, e.g. `birdc`
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "birdc".to_string(),
            args: vec!["configure".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram: TelegramConfig,
    pub gotify: GotifyConfig,
    pub email: EmailConfig,
    pub webhook: WebhookConfig,
}

impl AlertsConfig {
    /// Whether any destination is enabled
    pub fn any_enabled(&self) -> bool {
        self.telegram.enabled || self.gotify.enabled || self.email.enabled || self.webhook.enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    /// Bot token can be set directly or via BIRDROUTES_TELEGRAM_TOKEN env var
    pub bot_token: SecureString,
    /// Environment variable name to read the token from (optional)
    #[serde(default)]
    pub token_env: Option<String>,
    pub chat_id: String,
}

impl TelegramConfig {
    /// Get the effective bot token, checking env vars first
    pub fn get_token(&self) -> SecureString {
        secret_from_env(
            self.token_env.as_deref(),
            "BIRDROUTES_TELEGRAM_TOKEN",
            &self.bot_token,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GotifyConfig {
    pub enabled: bool,
    pub url: String,
    /// Token can be set directly or via BIRDROUTES_GOTIFY_TOKEN env var
    pub token: SecureString,
    #[serde(default)]
    pub token_env: Option<String>,
}

impl GotifyConfig {
    pub fn get_token(&self) -> SecureString {
        secret_from_env(
            self.token_env.as_deref(),
            "BIRDROUTES_GOTIFY_TOKEN",
            &self.token,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    /// Password can be set directly or via BIRDROUTES_SMTP_PASSWORD env var
    pub smtp_password: SecureString,
    #[serde(default)]
    pub smtp_password_env: Option<String>,
    pub from: String,
    pub to: String,
}

impl EmailConfig {
    pub fn get_password(&self) -> SecureString {
        secret_from_env(
            self.smtp_password_env.as_deref(),
            "BIRDROUTES_SMTP_PASSWORD",
            &self.smtp_password,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    #[serde(deserialize_with = "deserialize_headers")]
    pub headers: HashMap<String, String>,
}

/// Deserialize and validate HTTP headers (reject injection attempts)
fn deserialize_headers<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let headers: HashMap<String, String> = HashMap::deserialize(deserializer)?;

    for (key, value) in &headers {
        if key.contains('\r') || key.contains('\n') {
            return Err(serde::de::Error::custom(format!(
                "Invalid header name '{}': contains newline characters",
                key
            )));
        }
        if value.contains('\r') || value.contains('\n') {
            return Err(serde::de::Error::custom(format!(
                "Invalid header value for '{}': contains newline characters",
                key
            )));
        }
        // RFC 7230 token subset
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_".contains(c))
        {
            return Err(serde::de::Error::custom(format!(
                "Invalid header name '{}': contains invalid characters",
                key
            )));
        }
    }

    Ok(headers)
}
