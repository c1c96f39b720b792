//! Background jobs for periodic maintenance tasks.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::interval};

use crate::quiz::SessionRegistry;

/// How often submitted sessions are swept out of the registry
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Start all background jobs
///
/// Returns the join handles so the caller can abort them on shutdown
pub fn start_background_jobs(
    sessions: Arc<SessionRegistry>,
    session_retention: Duration,
) -> Vec<JoinHandle<()>> {
    vec![tokio::spawn(periodic_session_reaper_job(
        sessions,
        session_retention,
    ))]
}

/// Drop submitted quiz sessions once they have been readable for
/// `retention`
async fn periodic_session_reaper_job(sessions: Arc<SessionRegistry>, retention: Duration) {
    let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
    let mut interval = interval(REAP_INTERVAL);

    loop {
        interval.tick().await;

        match sessions.reap_submitted(retention).await {
            0 => tracing::debug!("Session reaper: nothing to drop"),
            reaped => tracing::info!(reaped, "Session reaper dropped submitted quiz sessions"),
        }
    }
}
