//! The per-session countdown task.

use std::{sync::Arc, time::Duration};

use sa_engine::{Clock, TickOutcome};
use tokio::{task::AbortHandle, time::interval};
use tracing::Instrument;

use super::registry::{LiveSession, record_result};
use crate::store::Store;

const TICK: Duration = Duration::from_secs(1);

/// Spawn the one-second ticker driving `live` until it is submitted.
///
/// When the countdown expires the attempt is persisted while the session
/// lock is still held, so a concurrent manual submit cannot record a second
/// one. The session only turns `Submitted` once the attempt is saved; a
/// failed save is retried every tick. The task ends on its own once the
/// session is submitted by any path, and the returned handle stops it earlier.
pub(super) fn spawn_countdown(
    live: Arc<LiveSession>,
    store: Store,
    clock: Arc<dyn Clock>,
) -> AbortHandle {
    let span = tracing::info_span!(
        "quiz_countdown",
        session_id = %live.id(),
        quiz_id = %live.quiz_id(),
    );

    let task = async move {
        let mut ticker = interval(TICK);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let mut session = live.lock().await;
            let mut next = session.clone();
            match next.tick(clock.now()) {
                Ok(TickOutcome::Running { remaining_seconds }) => {
                    *session = next;
                    tracing::trace!(remaining_seconds, "tick");
                }
                Ok(TickOutcome::Expired(result)) => {
                    match record_result(&store, live.owner_id(), &result).await {
                        Ok(()) => {
                            *session = next;
                            tracing::info!(
                                score = result.score.score,
                                "time is up, quiz auto-submitted"
                            );
                            break;
                        }
                        // Session stays in progress; the next tick tries again
                        Err(e) => tracing::warn!(
                            error = %e,
                            "failed to persist auto-submitted attempt, retrying"
                        ),
                    }
                }
                Err(_) => break,
            }
        }
    };

    tokio::spawn(task.instrument(span)).abort_handle()
}
