//! Quiz engine: a session plus the timed pause between answer and next item.
//!
//! After a submission the revealed answer stays visible for a short pause
//! before the session moves on. Each submission schedules its own advance
//! and cancels the one scheduled before it, so at most one advance is ever
//! pending and a burst of submissions moves the cursor exactly once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::error::QuizError;
use crate::model::{Answers, Field, QuizItem, ReferenceData};
use crate::proficiency::ProficiencyTracker;
use crate::session::{QuizSession, SessionOptions, SessionProgress, SessionSummary, Submission};

/// Default pause between a submission and the next item.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(600);

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct QuizEngineConfig {
    /// How long a revealed answer stays on screen. Zero advances immediately.
    pub pause: Duration,
}

impl Default for QuizEngineConfig {
    fn default() -> Self {
        Self {
            pause: DEFAULT_PAUSE,
        }
    }
}

/// Drives one quiz session at a time over shared reference data.
pub struct QuizEngine {
    data: Arc<ReferenceData>,
    tracker: Arc<ProficiencyTracker>,
    session: Arc<Mutex<Option<QuizSession>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    config: QuizEngineConfig,
}

impl QuizEngine {
    pub fn new(
        data: Arc<ReferenceData>,
        tracker: Arc<ProficiencyTracker>,
        config: QuizEngineConfig,
    ) -> Self {
        Self {
            data,
            tracker,
            session: Arc::new(Mutex::new(None)),
            pending: Mutex::new(None),
            config,
        }
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn tracker(&self) -> &ProficiencyTracker {
        &self.tracker
    }

    fn session(&self) -> MutexGuard<'_, Option<QuizSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Start a new session, replacing any running one.
    pub fn start<R: Rng + ?Sized>(
        &self,
        options: SessionOptions,
        rng: &mut R,
    ) -> Result<SessionProgress, QuizError> {
        self.cancel_pending();
        let session = QuizSession::start(&self.data, options, rng)?;
        let progress = session.progress();
        *self.session() = Some(session);
        Ok(progress)
    }

    pub fn current_item(&self) -> Option<QuizItem> {
        self.session().as_ref()?.current_item().cloned()
    }

    /// Fields to prompt for on the current item.
    pub fn current_fields(&self) -> Option<Vec<Field>> {
        self.session().as_ref()?.fields(&self.data)
    }

    pub fn progress(&self) -> Option<SessionProgress> {
        self.session().as_ref().map(QuizSession::progress)
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.session().as_ref().map(QuizSession::summary)
    }

    /// Submit answers for the current item and schedule the advance.
    ///
    /// With a non-zero pause this must be called from within a Tokio runtime.
    pub fn submit(&self, answers: &Answers) -> Result<Submission, QuizError> {
        let submission = {
            let mut guard = self.session();
            let session = guard.as_mut().ok_or(QuizError::NotStarted)?;
            session.submit(answers, &self.data, &self.tracker)?
        };

        self.cancel_pending();
        let ticket = submission.ticket;
        if self.config.pause.is_zero() {
            if let Some(session) = self.session().as_mut() {
                session.advance(ticket);
            }
        } else {
            let session = Arc::clone(&self.session);
            let pause = self.config.pause;
            let handle = tokio::spawn(async move {
                tokio::time::sleep(pause).await;
                let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(session) = guard.as_mut() {
                    if !session.advance(ticket) {
                        tracing::debug!("stale advance ignored");
                    }
                }
            });
            *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }
        Ok(submission)
    }

    /// Skip the current item without scoring it.
    pub fn skip(&self) -> Result<bool, QuizError> {
        self.cancel_pending();
        let mut guard = self.session();
        let session = guard.as_mut().ok_or(QuizError::NotStarted)?;
        Ok(session.skip())
    }

    /// Wait for a scheduled advance, if any, to complete.
    pub async fn settle(&self) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // An aborted task resolves to a cancellation error; nothing to do.
            let _ = handle.await;
        }
    }
}

impl Drop for QuizEngine {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
