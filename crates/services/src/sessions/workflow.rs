use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lamed_core::model::{Category, ItemId, NewProgressEntry};
use storage::repository::{ItemRepository, ProgressRepository};

use crate::Clock;
use crate::audio::{AudioCues, NullAudioCues, SoundCue, SpeechLang};
use crate::error::SessionError;
use super::source::{MathQuestionSource, PoolQuestionSource};
use super::tracker::{AnswerOutcome, PracticeSession, SessionConfig};

/// Result of driving one answer through the loop service.
#[derive(Debug)]
pub struct SessionAnswerResult {
    pub outcome: AnswerOutcome,
    pub score: u32,
    pub attempts: u32,
    /// Handle of the detached snapshot write, when this answer crossed a
    /// snapshot boundary. Surfaced for tests; gameplay never waits on it.
    pub persist: Option<JoinHandle<()>>,
}

/// Orchestrates practice sessions over injected repositories.
///
/// Persistence is fire-and-forget: snapshot writes run on detached tasks,
/// failures are logged and swallowed, and play continues either way.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    items: Arc<dyn ItemRepository>,
    progress: Arc<dyn ProgressRepository>,
    audio: Arc<dyn AudioCues>,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        items: Arc<dyn ItemRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            items,
            progress,
            audio: Arc::new(NullAudioCues),
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio: Arc<dyn AudioCues>) -> Self {
        self.audio = audio;
        self
    }

    /// Start a drill over every item in the category.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` when the category has fewer than
    /// four items; the caller shows the "not enough content" view and no
    /// session starts. Returns `SessionError::Storage` on repository
    /// failures.
    pub async fn start_drill(&self, category: Category) -> Result<PracticeSession, SessionError> {
        let pool = self.items.list_items(category).await?;
        let source = PoolQuestionSource::new(category, pool);
        let session =
            PracticeSession::start(Box::new(source), SessionConfig::drill(), self.clock.now())?;
        self.announce(&session);
        Ok(session)
    }

    /// Start a quick-math game. Needs no stored content.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if a problem cannot be built.
    pub fn start_quick_math(&self) -> Result<PracticeSession, SessionError> {
        PracticeSession::start(
            Box::new(MathQuestionSource::new()),
            SessionConfig::quick_math(),
            self.clock.now(),
        )
    }

    /// Drive one answer through the session.
    ///
    /// Post-end answers are reported as `AnswerOutcome::Ignored` rather than
    /// an error; the screen may still be dispatching clicks while tearing
    /// down. Every fifth attempt detaches a snapshot write.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the question source fails mid-session.
    pub fn submit_answer(
        &self,
        session: &mut PracticeSession,
        choice_id: ItemId,
    ) -> Result<SessionAnswerResult, SessionError> {
        let now = self.clock.now();
        let outcome = match session.submit_answer(choice_id, now) {
            Ok(outcome) => outcome,
            Err(SessionError::NotActive) => {
                debug!(choice = %choice_id, "answer ignored: session is not active");
                return Ok(SessionAnswerResult {
                    outcome: AnswerOutcome::Ignored,
                    score: session.score(),
                    attempts: session.attempts(),
                    persist: None,
                });
            }
            Err(other) => return Err(other),
        };

        match &outcome {
            AnswerOutcome::Correct { .. } => {
                self.audio.play(SoundCue::Success);
                self.announce(session);
            }
            AnswerOutcome::Incorrect { .. } => self.audio.play(SoundCue::Failure),
            AnswerOutcome::Ignored => {}
        }

        let persist = if session.persist_due() {
            Some(self.spawn_persist(session.progress_entry(now)?, now))
        } else {
            None
        };

        Ok(SessionAnswerResult {
            outcome,
            score: session.score(),
            attempts: session.attempts(),
            persist,
        })
    }

    /// End the session and force a final snapshot, regardless of the
    /// five-attempt cadence.
    ///
    /// A session with no attempts writes nothing: the store rejects
    /// zero-question payloads, so there is nothing worth sending.
    pub fn end_session(&self, session: &mut PracticeSession) -> Option<JoinHandle<()>> {
        let now = self.clock.now();
        let handle = if session.attempts() == 0 {
            debug!("skipping final snapshot: no attempts recorded");
            None
        } else {
            match session.progress_entry(now) {
                Ok(entry) => Some(self.spawn_persist(entry, now)),
                Err(err) => {
                    warn!(error = %err, "failed to build final snapshot");
                    None
                }
            }
        };
        session.end();
        handle
    }

    fn announce(&self, session: &PracticeSession) {
        if let Some(question) = session.current_question() {
            let target = question.target();
            let text = session
                .round_prompt()
                .unwrap_or_else(|| target.spoken_text().to_string());
            self.audio
                .speak(&text, SpeechLang::for_category(target.category()));
        }
    }

    fn spawn_persist(&self, entry: NewProgressEntry, recorded_at: DateTime<Utc>) -> JoinHandle<()> {
        let progress = Arc::clone(&self.progress);
        tokio::spawn(async move {
            if let Err(err) = progress.record_progress(&entry, recorded_at).await {
                warn!(error = %err, "progress snapshot failed; play continues");
            }
        })
    }
}
