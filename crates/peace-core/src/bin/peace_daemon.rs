//! dev-peace: background developer-activity observer.
//!
//! Watches configured git working trees, infers work sessions from branch
//! and commit activity, and drives Jira worklogs and status automation.

use std::time::Duration;

use peace_config::DevPeaceConfig;
use peace_core::{SessionManager, Supervisor};
use peace_paths::DevPeacePaths;
use peace_store::Store;
use peace_tracker::{IssueTracker, JiraClient, NullTracker};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!(event = "daemon.start_started");

    let exit_code = match run() {
        Ok(()) => {
            info!(event = "daemon.start_completed");
            0
        }
        Err(e) => {
            error!(event = "daemon.start_failed", error = %e);
            eprintln!("peace-daemon: {e}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Starting dev-peace daemon (PID: {})...", std::process::id());

    let paths = DevPeacePaths::resolve()?;
    let config = DevPeaceConfig::load(&paths)?;
    let store = Store::open(&paths.database_file())?;

    let tracker: Box<dyn IssueTracker> = if config.has_jira_credentials() {
        let client = JiraClient::new(
            config.jira_url.clone(),
            config.jira_user.clone(),
            config.jira_token.clone(),
        );
        if !client.connect() {
            error!(event = "daemon.tracker_connect_failed");
        }
        Box::new(client)
    } else {
        info!(event = "daemon.tracker_unconfigured");
        Box::new(NullTracker)
    };

    let ignore_patterns = config.monitoring.ignore_patterns.clone();
    let manager = SessionManager::new(store, tracker, config);
    let mut supervisor = Supervisor::new(manager, ignore_patterns);
    supervisor.start(None)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let token = CancellationToken::new();
        let shutdown = tokio::spawn(peace_core::wait_for_shutdown_signal(token.clone()));

        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    supervisor.poll();
                }
                _ = token.cancelled() => {
                    break;
                }
            }
        }

        shutdown.await.ok();
        info!(event = "daemon.shutdown_started");
        supervisor.shutdown();
        info!(event = "daemon.shutdown_completed");
    });

    Ok(())
}
