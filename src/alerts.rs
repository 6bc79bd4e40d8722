//! Alert system for birdroutes (Telegram, Gotify, email, webhook).

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::AlertsConfig;
use crate::utils::{escape_markdown, format_count_with_separator, truncate};

/// Timeout for alert HTTP requests (30s for slow networks/SMTP)
const TIMEOUT_SECS: u64 = 30;

/// Telegram rejects messages longer than 4096 characters
const TELEGRAM_MAX_LEN: usize = 4096;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

impl AlertLevel {
    fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "INFO",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Error => "ERROR",
        }
    }

    fn gotify_priority(&self) -> u8 {
        match self {
            AlertLevel::Info => 2,
            AlertLevel::Warning => 5,
            AlertLevel::Error => 8,
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            AlertLevel::Info => "✅",
            AlertLevel::Warning => "⚠️",
            AlertLevel::Error => "❌",
        }
    }
}

/// A notification about the outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

/// Receiver of run outcome notifications.
///
/// Delivery failures are the notifier's problem: `notify` never fails the run.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert);
}

/// Alert manager
pub struct AlertManager {
    config: AlertsConfig,
    client: Client,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for alerts")?;

        Ok(Self { config, client })
    }

    /// Send an alert to all configured destinations
    pub async fn send(&self, level: AlertLevel, title: &str, message: &str) {
        let mut success_count = 0;
        let mut destinations = Vec::new();

        if self.config.telegram.enabled {
            destinations.push("Telegram");
            match self.send_telegram(level, title, message).await {
                Ok(()) => success_count += 1,
                Err(e) => warn!("Telegram alert failed: {:#}", e),
            }
        }

        if self.config.gotify.enabled {
            destinations.push("Gotify");
            match self.send_gotify(level, title, message).await {
                Ok(()) => success_count += 1,
                Err(e) => warn!("Gotify alert failed: {:#}", e),
            }
        }

        if self.config.email.enabled {
            destinations.push("Email");
            match self.send_email(level, title, message).await {
                Ok(()) => success_count += 1,
                Err(e) => warn!("Email alert failed: {:#}", e),
            }
        }

        if self.config.webhook.enabled {
            destinations.push("Webhook");
            match self.send_webhook(level, title, message).await {
                Ok(()) => success_count += 1,
                Err(e) => warn!("Webhook alert failed: {:#}", e),
            }
        }

        if !destinations.is_empty() {
            debug!(
                "Alert sent to {}/{} destinations: {}",
                success_count,
                destinations.len(),
                destinations.join(", ")
            );
        }
    }

    /// Send alert via Telegram Bot API
    async fn send_telegram(&self, level: AlertLevel, title: &str, message: &str) -> Result<()> {
        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: &'a str,
            text: String,
            parse_mode: &'a str,
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            ok: bool,
            description: Option<String>,
        }

        let token = self.config.telegram.get_token();
        let url = format!("https://api.telegram.org/bot{}/sendMessage", token.as_str());

        let payload = SendMessage {
            chat_id: &self.config.telegram.chat_id,
            text: truncate(&telegram_text(level, title, message), TELEGRAM_MAX_LEN),
            parse_mode: "Markdown",
        };

        // The URL embeds the token: never include it in error context
        let response = self
            .client
            .post(&url)
            .form(&payload)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send Telegram alert: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let description = response
                .json::<ApiResponse>()
                .await
                .ok()
                .filter(|r| !r.ok)
                .and_then(|r| r.description)
                .unwrap_or_default();
            error!("Telegram alert failed with status: {}", status);
            anyhow::bail!("Telegram returned {} {}", status, description);
        }

        debug!("Telegram alert sent successfully");
        Ok(())
    }

    /// Send alert via Gotify
    async fn send_gotify(&self, level: AlertLevel, title: &str, message: &str) -> Result<()> {
        let url = format!("{}/message", self.config.gotify.url.trim_end_matches('/'));

        #[derive(Serialize)]
        struct GotifyMessage<'a> {
            title: &'a str,
            message: &'a str,
            priority: u8,
        }

        let payload = GotifyMessage {
            title,
            message,
            priority: level.gotify_priority(),
        };

        // Get token from env var or config (SecureString is zeroed on drop)
        let token = self.config.gotify.get_token();

        let response = self
            .client
            .post(&url)
            .header("X-Gotify-Key", token.as_str())
            .json(&payload)
            .send()
            .await
            .context("Failed to send Gotify alert")?;

        if !response.status().is_success() {
            let status = response.status();
            // Don't log response body as it may contain sensitive info
            error!("Gotify alert failed with status: {}", status);
            anyhow::bail!("Gotify returned {}", status);
        }

        debug!("Gotify alert sent successfully");
        Ok(())
    }

    /// Send alert via email (runs in blocking task to avoid blocking async executor)
    async fn send_email(&self, level: AlertLevel, title: &str, message: &str) -> Result<()> {
        let email_config = self.config.email.clone();
        let level_str = level.as_str().to_string();
        let title = title.to_string();
        let message = message.to_string();

        tokio::task::spawn_blocking(move || {
            let subject = format!("[birdroutes {}] {}", level_str, title);
            let body = format!(
                "birdroutes Alert\n\
                 ================\n\n\
                 Level: {}\n\
                 Title: {}\n\n\
                 Message:\n{}\n",
                level_str, title, message
            );

            let email = Message::builder()
                .from(
                    email_config
                        .from
                        .parse()
                        .context("Invalid 'from' email address")?,
                )
                .to(email_config
                    .to
                    .parse()
                    .context("Invalid 'to' email address")?)
                .subject(subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body)
                .context("Failed to build email")?;

            let password = email_config.get_password();

            let creds = Credentials::new(
                email_config.smtp_user.clone(),
                password.as_str().to_string(),
            );

            let mailer = SmtpTransport::relay(&email_config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(email_config.smtp_port)
                .credentials(creds)
                .build();

            mailer.send(&email).context("Failed to send email")?;

            Ok::<(), anyhow::Error>(())
        })
        .await
        .context("Email task panicked")??;

        debug!("Email alert sent successfully");
        Ok(())
    }

    /// Send alert via webhook
    async fn send_webhook(&self, level: AlertLevel, title: &str, message: &str) -> Result<()> {
        #[derive(Serialize)]
        struct WebhookPayload<'a> {
            level: &'a str,
            title: &'a str,
            message: &'a str,
            timestamp: String,
            source: &'a str,
        }

        let payload = WebhookPayload {
            level: level.as_str(),
            title,
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: "birdroutes",
        };

        let mut request = self.client.post(&self.config.webhook.url).json(&payload);

        // Headers were validated during config deserialization
        for (key, value) in &self.config.webhook.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.context("Failed to send webhook")?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Webhook returned non-success status: {}", status);
        }

        debug!("Webhook alert sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Notifier for AlertManager {
    async fn notify(&self, alert: &Alert) {
        self.send(alert.level, &alert.title, &alert.message).await;
    }
}

/// Notifier that only logs; used when no destination is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) {
        debug!("[{}] {}: {}", alert.level.as_str(), alert.title, alert.message);
    }
}

/// Pick the notifier for a config: an [`AlertManager`] if any destination
/// is enabled and the HTTP client builds, otherwise [`LogNotifier`].
pub fn notifier_for(config: &AlertsConfig) -> Box<dyn Notifier> {
    if !config.any_enabled() {
        return Box::new(LogNotifier);
    }
    match AlertManager::new(config.clone()) {
        Ok(manager) => Box::new(manager),
        Err(e) => {
            warn!("Alerts disabled: {:#}", e);
            Box::new(LogNotifier)
        }
    }
}

/// Bold title, escaped body: messages carry paths and error text.
fn telegram_text(level: AlertLevel, title: &str, message: &str) -> String {
    format!(
        "{} *{}*\n{}",
        level.icon(),
        escape_markdown(title),
        escape_markdown(message)
    )
}

/// Alert types for common events
pub struct AlertTypes;

impl AlertTypes {
    /// Routes written and router reloaded
    pub fn update_success(routes: usize, addresses: u64) -> Alert {
        Alert {
            level: AlertLevel::Info,
            title: "BIRD route update completed".to_string(),
            message: format!(
                "Routes: `{}`\nAddresses covered: `{}`\nReload: Successful",
                routes,
                format_count_with_separator(addresses)
            ),
        }
    }

    /// Routes written, reload disabled
    pub fn generated_without_reload(routes: usize, addresses: u64) -> Alert {
        Alert {
            level: AlertLevel::Info,
            title: "Route file generated".to_string(),
            message: format!(
                "Routes: `{}`\nAddresses covered: `{}`\nReload: Skipped",
                routes,
                format_count_with_separator(addresses)
            ),
        }
    }

    /// The prefix list could not be obtained; nothing was written
    pub fn update_failed(error: &str) -> Alert {
        Alert {
            level: AlertLevel::Error,
            title: "Route update failed".to_string(),
            message: format!("{}\nThe existing route file was left untouched.", error),
        }
    }

    /// The route file could not be written
    pub fn write_failed(path: &str, error: &str) -> Alert {
        Alert {
            level: AlertLevel::Error,
            title: "Failed to write route file".to_string(),
            message: format!("{}: {}", path, error),
        }
    }

    /// The file was written but the router did not reload
    pub fn reload_failed(routes: usize, error: &str) -> Alert {
        Alert {
            level: AlertLevel::Warning,
            title: "Route file saved, but BIRD reload failed".to_string(),
            message: format!("Routes: `{}`\n{}", routes, error),
        }
    }
}
