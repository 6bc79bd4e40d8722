//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::alerts::{notifier_for, AlertTypes, LogNotifier, Notifier};
use crate::cli::RouteOverrides;
use crate::config::Config;
use crate::error::RouteError;
use crate::fetcher::{Fetcher, PrefixSource};
use crate::lock::LockGuard;
use crate::reload::{CommandReloader, Reloader};
use crate::routes::plan_routes;
use crate::sink::{FileSink, RouteSink, StdoutSink};
use crate::utils::{format_count, format_count_with_separator};

/// Counters for one update run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Non-blank, non-comment lines in the downloaded list
    pub candidates: usize,
    /// Prefixes kept after parsing and filtering
    pub accepted: usize,
    /// Malformed lines skipped
    pub invalid: usize,
    /// Prefixes dropped as reserved or ignored space
    pub excluded: usize,
    /// Route statements written
    pub routes: usize,
    /// Addresses covered by the written routes
    pub addresses: u64,
    /// Whether the router was reloaded
    pub reloaded: bool,
}

impl std::fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} routes ({} addresses) from {} prefixes ({} invalid, {} excluded)",
            format_count(self.routes as u64),
            format_count_with_separator(self.addresses),
            format_count(self.accepted as u64),
            self.invalid,
            self.excluded
        )
    }
}

/// Fetch, generate, write, reload, notify.
///
/// Every failing step sends its alert before the error is returned, and a
/// failure before the write leaves the existing route file untouched.
pub async fn execute(
    config: &Config,
    source: &dyn PrefixSource,
    sink: &dyn RouteSink,
    reloader: Option<&dyn Reloader>,
    notifier: &dyn Notifier,
) -> Result<UpdateReport> {
    info!("Downloading prefix list from {} ...", config.source_url);
    let content = match source.fetch(&config.source_url).await {
        Ok(content) => content,
        Err(e) => {
            let reason = format!("{:#}", e);
            error!("Download failed: {}", reason);
            notifier.notify(&AlertTypes::update_failed(&reason)).await;
            return Err(RouteError::Fetch(reason).into());
        }
    };

    let mode = config.mode();
    let plan = plan_routes(&content, &config.interface, mode);

    if !plan.parsed.invalid.is_empty() {
        warn!("Skipped {} malformed lines", plan.parsed.invalid.len());
    }
    if plan.parsed.networks.is_empty() {
        let err = RouteError::EmptyPrefixList;
        error!("{}", err);
        notifier
            .notify(&AlertTypes::update_failed(&err.to_string()))
            .await;
        return Err(err.into());
    }

    let mut report = UpdateReport {
        candidates: plan.parsed.candidates,
        accepted: plan.parsed.networks.len(),
        invalid: plan.parsed.invalid.len(),
        excluded: plan.parsed.excluded,
        routes: plan.routes.len(),
        addresses: plan.routes.address_count(),
        reloaded: false,
    };
    info!(
        "Generated {} {} routes via {} from {} prefixes",
        format_count(report.routes as u64),
        mode,
        config.interface,
        format_count(report.accepted as u64)
    );

    let destination = sink.describe();
    if let Err(e) = sink.write(&plan.rendered) {
        let reason = format!("{:#}", e);
        error!("Failed to write {}: {}", destination, reason);
        notifier
            .notify(&AlertTypes::write_failed(&destination, &reason))
            .await;
        return Err(RouteError::Write(reason).into());
    }
    info!("Routes written to {}", destination);

    match reloader {
        Some(reloader) => {
            if let Err(e) = reloader.reload() {
                let reason = format!("{:#}", e);
                error!("Reload failed: {}", reason);
                notifier
                    .notify(&AlertTypes::reload_failed(report.routes, &reason))
                    .await;
                return Err(RouteError::Reload(reason).into());
            }
            report.reloaded = true;
            notifier
                .notify(&AlertTypes::update_success(report.routes, report.addresses))
                .await;
        }
        None => {
            info!("Router reload skipped");
            notifier
                .notify(&AlertTypes::generated_without_reload(
                    report.routes,
                    report.addresses,
                ))
                .await;
        }
    }

    Ok(report)
}

/// Run the update command
pub async fn run(overrides: &RouteOverrides, dry_run: bool, config_path: &Path) -> Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    overrides.apply(&mut config)?;

    let fetcher = Fetcher::new()?;

    if dry_run {
        info!("Dry run: routes go to stdout, nothing is written or reloaded");
        let report = execute(&config, &fetcher, &StdoutSink, None, &LogNotifier).await?;
        info!("[DRY RUN] {}", report);
        return Ok(());
    }

    let _lock = LockGuard::acquire(&config.lock_file())?;

    let sink = FileSink::new(&config.output_file);
    let reloader = config
        .reload
        .enabled
        .then(|| CommandReloader::from_config(&config.reload));
    let notifier = notifier_for(&config.alerts);

    let report = execute(
        &config,
        &fetcher,
        &sink,
        reloader.as_ref().map(|r| r as &dyn Reloader),
        notifier.as_ref(),
    )
    .await?;

    println!(
        "[OK] {}{}",
        report,
        if report.reloaded { ", BIRD reloaded" } else { "" }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertLevel, MockNotifier};
    use crate::fetcher::MockPrefixSource;
    use crate::reload::MockReloader;
    use crate::sink::MockRouteSink;
    use std::sync::{Arc, Mutex};

    const LIST: &str = "# chnroutes\n1.0.1.0/24\n1.0.2.0/23\nnot-an-ip\n10.1.0.0/16\n";

    fn source_returning(body: &'static str) -> MockPrefixSource {
        let mut source = MockPrefixSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(move |_| Ok(body.to_string()));
        source
    }

    fn recording_notifier() -> (MockNotifier, Arc<Mutex<Vec<(AlertLevel, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().returning(move |alert| {
            log.lock()
                .unwrap()
                .push((alert.level, alert.title.clone()));
        });
        (notifier, seen)
    }

    fn accepting_sink(written: Arc<Mutex<Option<String>>>) -> MockRouteSink {
        let mut sink = MockRouteSink::new();
        sink.expect_describe()
            .returning(|| "/etc/bird/routes.conf".to_string());
        sink.expect_write().times(1).returning(move |contents| {
            *written.lock().unwrap() = Some(contents.to_string());
            Ok(())
        });
        sink
    }

    #[tokio::test]
    async fn test_execute_full_run() {
        let config = Config::default();
        let source = source_returning(LIST);
        let written = Arc::new(Mutex::new(None));
        let sink = accepting_sink(Arc::clone(&written));
        let mut reloader = MockReloader::new();
        reloader.expect_reload().times(1).returning(|| Ok(()));
        let (notifier, alerts) = recording_notifier();

        let report = execute(&config, &source, &sink, Some(&reloader), &notifier)
            .await
            .unwrap();

        assert_eq!(
            report,
            UpdateReport {
                candidates: 4,
                accepted: 2,
                invalid: 1,
                excluded: 1,
                routes: 2,
                addresses: 768,
                reloaded: true,
            }
        );
        assert_eq!(
            written.lock().unwrap().as_deref(),
            Some("route 1.0.1.0/24 via \"eth0\";\nroute 1.0.2.0/23 via \"eth0\";\n")
        );
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, AlertLevel::Info);
        assert_eq!(alerts[0].1, "BIRD route update completed");
    }

    #[tokio::test]
    async fn test_execute_fetch_failure_writes_nothing() {
        let config = Config::default();
        let mut source = MockPrefixSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(anyhow::anyhow!("HTTP 503 Service Unavailable")));
        let mut sink = MockRouteSink::new();
        sink.expect_write().never();
        sink.expect_describe().returning(String::new);
        let mut reloader = MockReloader::new();
        reloader.expect_reload().never();
        let (notifier, alerts) = recording_notifier();

        let err = execute(&config, &source, &sink, Some(&reloader), &notifier)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RouteError>(),
            Some(RouteError::Fetch(reason)) if reason.contains("503")
        ));
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, AlertLevel::Error);
    }

    #[tokio::test]
    async fn test_execute_empty_list_writes_nothing() {
        let config = Config::default();
        let source = source_returning("# nothing here\n\ngarbage\n");
        let mut sink = MockRouteSink::new();
        sink.expect_write().never();
        sink.expect_describe().returning(String::new);
        let (notifier, alerts) = recording_notifier();

        let err = execute(&config, &source, &sink, None, &notifier)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RouteError>(),
            Some(RouteError::EmptyPrefixList)
        ));
        assert_eq!(alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_write_failure_skips_reload() {
        let config = Config::default();
        let source = source_returning(LIST);
        let mut sink = MockRouteSink::new();
        sink.expect_describe()
            .returning(|| "/etc/bird/routes.conf".to_string());
        sink.expect_write()
            .returning(|_| Err(anyhow::anyhow!("Permission denied")));
        let mut reloader = MockReloader::new();
        reloader.expect_reload().never();
        let (notifier, alerts) = recording_notifier();

        let err = execute(&config, &source, &sink, Some(&reloader), &notifier)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RouteError>(),
            Some(RouteError::Write(_))
        ));
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].1, "Failed to write route file");
    }

    #[tokio::test]
    async fn test_execute_reload_failure_keeps_file() {
        let config = Config::default();
        let source = source_returning(LIST);
        let written = Arc::new(Mutex::new(None));
        let sink = accepting_sink(Arc::clone(&written));
        let mut reloader = MockReloader::new();
        reloader
            .expect_reload()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("birdc configure exited with status 1")));
        let (notifier, alerts) = recording_notifier();

        let err = execute(&config, &source, &sink, Some(&reloader), &notifier)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RouteError>(),
            Some(RouteError::Reload(_))
        ));
        assert!(written.lock().unwrap().is_some());
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, AlertLevel::Warning);
    }

    #[tokio::test]
    async fn test_execute_without_reloader() {
        let config = Config::default();
        let source = source_returning(LIST);
        let written = Arc::new(Mutex::new(None));
        let sink = accepting_sink(Arc::clone(&written));
        let (notifier, alerts) = recording_notifier();

        let report = execute(&config, &source, &sink, None, &notifier)
            .await
            .unwrap();

        assert!(!report.reloaded);
        assert_eq!(alerts.lock().unwrap()[0].1, "Route file generated");
    }

    #[tokio::test]
    async fn test_execute_reverse_uses_interface() {
        let config = Config {
            reverse: true,
            interface: "wg0".to_string(),
            ..Default::default()
        };
        let source = source_returning("0.0.0.0/1\n");
        let written = Arc::new(Mutex::new(None));
        let sink = accepting_sink(Arc::clone(&written));
        let (notifier, _) = recording_notifier();

        let report = execute(&config, &source, &sink, None, &notifier)
            .await
            .unwrap();

        let written = written.lock().unwrap();
        let contents = written.as_deref().unwrap();
        assert!(contents.starts_with("route 128.0.0.0/3 via \"wg0\";\n"));
        assert!(!contents.lines().any(|l| l.starts_with("route 0.")));
        assert_eq!(report.routes, contents.lines().count());
    }

    #[tokio::test]
    async fn test_execute_passes_source_url() {
        let config = Config {
            source_url: "https://lists.example.net/cn.txt".to_string(),
            ..Default::default()
        };
        let mut source = MockPrefixSource::new();
        source
            .expect_fetch()
            .withf(|url| url == "https://lists.example.net/cn.txt")
            .times(1)
            .returning(|_| Ok("1.0.1.0/24\n".to_string()));
        let written = Arc::new(Mutex::new(None));
        let sink = accepting_sink(written);
        let (notifier, _) = recording_notifier();

        assert!(execute(&config, &source, &sink, None, &notifier).await.is_ok());
    }

    #[test]
    fn test_report_display() {
        let report = UpdateReport {
            candidates: 10,
            accepted: 8,
            invalid: 1,
            excluded: 1,
            routes: 5,
            addresses: 1_048_576,
            reloaded: true,
        };
        assert_eq!(
            report.to_string(),
            "5 routes (1,048,576 addresses) from 8 prefixes (1 invalid, 1 excluded)"
        );
    }
}
