//! Live quiz sessions.
//!
//! Sessions exist only in memory. Each one is guarded by its own async
//! mutex, through which countdown ticks and client calls are serialized,
//! and owns the abort handle of its countdown task. Submitted sessions stay
//! readable until the reaper job drops them; later mutations see
//! `InvalidState`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use chrono::Duration;
use sa_engine::{Clock, Navigation, Quiz, QuizSession, SessionResult};
use tokio::{
    sync::{Mutex, MutexGuard, RwLock},
    task::AbortHandle,
};
use uuid::Uuid;

use super::timer::spawn_countdown;
use crate::{error::ApiError, metrics, store::Store};

fn session_not_found() -> ApiError {
    ApiError::NotFound("Quiz session not found".to_string())
}

/// A session plus the handle of the task counting it down.
#[derive(Debug)]
pub struct LiveSession {
    id: Uuid,
    quiz_id: Uuid,
    owner_id: Uuid,
    session: Mutex<QuizSession>,
    timer: StdMutex<Option<AbortHandle>>,
}

impl LiveSession {
    fn new(session: QuizSession) -> Self {
        Self {
            id: session.id(),
            quiz_id: session.quiz_id(),
            owner_id: session.owner_id(),
            session: Mutex::new(session),
            timer: StdMutex::new(None),
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub const fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, QuizSession> {
        self.session.lock().await
    }

    fn set_timer(&self, handle: AbortHandle) {
        *self.timer.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    fn stop_timer(&self) {
        if let Some(handle) = self.timer.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}

/// Append a finished session's attempt to its quiz.
pub(super) async fn record_result(
    store: &Store,
    owner_id: Uuid,
    result: &SessionResult,
) -> Result<(), ApiError> {
    if !store
        .append_attempt(owner_id, result.quiz_id, &result.attempt)
        .await?
    {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    metrics::record_quiz_attempt(result.mode.as_str());
    tracing::info!(
        quiz_id = %result.quiz_id,
        mode = result.mode.as_str(),
        score = result.score.score,
        total = result.score.total,
        time_taken = result.attempt.time_taken,
        "quiz attempt recorded"
    );
    Ok(())
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<LiveSession>>>,
    store: Store,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
            clock,
        }
    }

    /// Start an attempt at `quiz` and its countdown.
    pub async fn start(&self, quiz: &Quiz) -> Result<QuizSession, ApiError> {
        let session = QuizSession::start(quiz, self.clock.now())?;
        let snapshot = session.clone();

        let live = Arc::new(LiveSession::new(session));
        live.set_timer(spawn_countdown(
            Arc::clone(&live),
            self.store.clone(),
            Arc::clone(&self.clock),
        ));
        self.sessions.write().await.insert(live.id, live);

        tracing::info!(
            session_id = %snapshot.id(),
            quiz_id = %quiz.id,
            time_limit = snapshot.remaining_seconds(),
            "quiz session started"
        );
        Ok(snapshot)
    }

    async fn live(&self, owner_id: Uuid, session_id: Uuid) -> Result<Arc<LiveSession>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .filter(|live| live.owner_id == owner_id)
            .cloned()
            .ok_or_else(session_not_found)
    }

    pub async fn snapshot(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
    ) -> Result<QuizSession, ApiError> {
        let live = self.live(owner_id, session_id).await?;
        let session = live.lock().await;
        Ok(session.clone())
    }

    pub async fn answer(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        index: usize,
        value: String,
    ) -> Result<QuizSession, ApiError> {
        let live = self.live(owner_id, session_id).await?;
        let mut session = live.lock().await;
        session.answer(index, value)?;
        Ok(session.clone())
    }

    pub async fn navigate(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        to: Navigation,
    ) -> Result<QuizSession, ApiError> {
        let live = self.live(owner_id, session_id).await?;
        let mut session = live.lock().await;
        session.navigate(to)?;
        Ok(session.clone())
    }

    /// Manual submission. Persists the attempt, then stops the countdown.
    ///
    /// If the countdown already expired this fails with `InvalidState` and
    /// the auto-submitted attempt stands. If the attempt cannot be saved the
    /// session stays in progress with its countdown running, so the submit
    /// can be retried.
    pub async fn submit(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
    ) -> Result<SessionResult, ApiError> {
        let live = self.live(owner_id, session_id).await?;
        let mut session = live.lock().await;

        let mut submitted = session.clone();
        let result = submitted.submit(self.clock.now())?;
        record_result(&self.store, owner_id, &result).await?;

        *session = submitted;
        live.stop_timer();
        Ok(result)
    }

    /// Discard a session without recording an attempt.
    pub async fn abandon(&self, owner_id: Uuid, session_id: Uuid) -> Result<(), ApiError> {
        let live = self.live(owner_id, session_id).await?;
        // Wait out an in-flight auto-submit before tearing down
        let _session = live.lock().await;
        live.stop_timer();
        self.sessions.write().await.remove(&session_id);

        tracing::info!(%session_id, quiz_id = %live.quiz_id, "quiz session abandoned");
        Ok(())
    }

    /// Abandon every session of a quiz. Returns how many were dropped.
    pub async fn abandon_quiz(&self, owner_id: Uuid, quiz_id: Uuid) -> usize {
        let removed: Vec<_> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<_> = sessions
                .values()
                .filter(|live| live.owner_id == owner_id && live.quiz_id == quiz_id)
                .map(|live| live.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for live in &removed {
            let _session = live.lock().await;
            live.stop_timer();
        }
        removed.len()
    }

    /// Drop sessions submitted more than `retention` ago.
    pub async fn reap_submitted(&self, retention: Duration) -> usize {
        let cutoff = self.clock.now() - retention;

        let candidates: Vec<_> = self.sessions.read().await.values().cloned().collect();
        let mut expired = Vec::new();
        for live in candidates {
            let session = live.lock().await;
            if session.submitted_at().is_some_and(|at| at <= cutoff) {
                expired.push(live.id);
            }
        }

        if !expired.is_empty() {
            let mut sessions = self.sessions.write().await;
            for id in &expired {
                sessions.remove(id);
            }
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Stop every countdown and forget all sessions.
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = self.sessions.write().await.drain().map(|(_, v)| v).collect();
        for live in &sessions {
            live.stop_timer();
        }
        tracing::info!(count = sessions.len(), "quiz sessions shut down");
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for live in self.sessions.get_mut().values() {
            live.stop_timer();
        }
    }
}
