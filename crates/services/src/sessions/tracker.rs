use chrono::{DateTime, Utc};
use std::fmt;

use lamed_core::model::{Category, DrillItem, ItemId, NewProgressEntry, Question};

use crate::error::SessionError;
use crate::math;
use super::source::QuestionSource;

/// Attempts between periodic progress snapshots.
pub const PERSIST_EVERY: u32 = 5;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Per-variant tuning for a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Draw a fresh question even when the answer was wrong. The drill
    /// screens keep the question for a retry; quick-math always moves on.
    pub advance_on_incorrect: bool,
    /// Hard stop for timed games, measured from session start.
    pub time_limit_secs: Option<u32>,
}

impl SessionConfig {
    /// Settings for the numbers/letters drill screens.
    #[must_use]
    pub fn drill() -> Self {
        Self {
            advance_on_incorrect: false,
            time_limit_secs: None,
        }
    }

    /// Settings for the quick-math game.
    #[must_use]
    pub fn quick_math() -> Self {
        Self {
            advance_on_incorrect: true,
            time_limit_secs: Some(math::GAME_SECS),
        }
    }
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What happened to a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The chosen item was the target.
    Correct { target: DrillItem },
    /// Wrong pick; carries the offending choice for feedback display, when
    /// the choice id matched one of the offered items.
    Incorrect { chosen: Option<DrillItem> },
    /// The session was no longer active; nothing changed.
    Ignored,
}

/// Lifecycle of a practice session. Idle is the absence of a session;
/// construction via `start` goes straight to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Ended,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one practice run.
///
/// Owns the question source, the score/attempt counters, and the current
/// question. All timestamps come from the caller so time stays
/// deterministic. The invariant `score <= attempts` holds after every
/// transition.
pub struct PracticeSession {
    source: Box<dyn QuestionSource>,
    config: SessionConfig,
    phase: SessionPhase,
    score: u32,
    attempts: u32,
    started_at: DateTime<Utc>,
    current_question: Option<Question>,
}

impl PracticeSession {
    /// Start a new session, drawing the first question.
    ///
    /// # Errors
    ///
    /// Propagates `GeneratorError::InsufficientPool` when the source cannot
    /// produce a question; the caller must show the "not enough content"
    /// state and must not treat the session as started.
    pub fn start(
        mut source: Box<dyn QuestionSource>,
        config: SessionConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let first = source.next_question()?;
        Ok(Self {
            source,
            config,
            phase: SessionPhase::Active,
            score: 0,
            attempts: 0,
            started_at,
            current_question: Some(first),
        })
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.source.category()
    }

    #[must_use]
    pub fn item_range(&self) -> u32 {
        self.source.item_range()
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Presentation prompt for the current round, when the source has one.
    #[must_use]
    pub fn round_prompt(&self) -> Option<String> {
        self.source.round_prompt()
    }

    /// True once the game timer has run out, for timed variants.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.config.time_limit_secs {
            Some(limit) => now >= self.started_at + chrono::Duration::seconds(i64::from(limit)),
            None => false,
        }
    }

    /// Whole seconds elapsed since the session started.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        let secs = (now - self.started_at).num_seconds();
        u32::try_from(secs.max(0)).unwrap_or(u32::MAX)
    }

    /// Handle one answer.
    ///
    /// Correct answers bump both counters and draw the next question; wrong
    /// answers bump only the attempt counter and keep the question for a
    /// retry unless the variant advances regardless.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` after `end` or past the time limit.
    pub fn submit_answer(
        &mut self,
        choice_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        if !self.is_active() || self.is_expired(now) {
            return Err(SessionError::NotActive);
        }
        let (correct, target, chosen) = {
            let Some(question) = self.current_question.as_ref() else {
                return Err(SessionError::NotActive);
            };
            (
                question.is_correct(choice_id),
                question.target().clone(),
                question.choice(choice_id).cloned(),
            )
        };

        self.attempts += 1;

        if correct {
            self.score += 1;
            self.current_question = Some(self.source.next_question()?);
            Ok(AnswerOutcome::Correct { target })
        } else {
            if self.config.advance_on_incorrect {
                self.current_question = Some(self.source.next_question()?);
            }
            Ok(AnswerOutcome::Incorrect { chosen })
        }
    }

    /// True when the attempt counter sits on a snapshot boundary.
    #[must_use]
    pub fn persist_due(&self) -> bool {
        self.attempts > 0 && self.attempts % PERSIST_EVERY == 0
    }

    /// Build the progress payload for the current counters.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no attempts have been recorded yet.
    pub fn progress_entry(&self, now: DateTime<Utc>) -> Result<NewProgressEntry, SessionError> {
        Ok(NewProgressEntry::from_parts(
            self.category(),
            self.score,
            self.attempts,
            self.elapsed_secs(now),
            self.item_range(),
        )?)
    }

    /// End the session: Active → Ended, dropping the current question.
    pub fn end(&mut self) {
        self.phase = SessionPhase::Ended;
        self.current_question = None;
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeSession")
            .field("category", &self.category())
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("attempts", &self.attempts)
            .field("started_at", &self.started_at)
            .field("has_question", &self.current_question.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
