use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::item::Category;

/// Storage identifier for a persisted progress entry.
///
/// NOTE: This is currently `i64` to match `SQLite` row IDs.
pub type EntryId = i64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("total_questions must be positive")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("item_range must be positive")]
    EmptyItemRange,
}

/// Summary of one practice burst, before the store assigns identity.
///
/// The session tracker builds one of these every 5 attempts and on session
/// end; the store assigns the id and timestamp on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgressEntry {
    category: Category,
    correct_answers: u32,
    total_questions: u32,
    time_taken_secs: u32,
    item_range: u32,
}

impl NewProgressEntry {
    /// Build a validated progress payload.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoQuestions` on a zero question count,
    /// `ProgressError::CountMismatch` when correct answers exceed it, and
    /// `ProgressError::EmptyItemRange` on a zero item range.
    pub fn from_parts(
        category: Category,
        correct_answers: u32,
        total_questions: u32,
        time_taken_secs: u32,
        item_range: u32,
    ) -> Result<Self, ProgressError> {
        if total_questions == 0 {
            return Err(ProgressError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(ProgressError::CountMismatch {
                correct: correct_answers,
                total: total_questions,
            });
        }
        if item_range == 0 {
            return Err(ProgressError::EmptyItemRange);
        }

        Ok(Self {
            category,
            correct_answers,
            total_questions,
            time_taken_secs,
            item_range,
        })
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn item_range(&self) -> u32 {
        self.item_range
    }

    /// Percentage score for this burst, rounded to the nearest integer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn score_percent(&self) -> u32 {
        (f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0).round() as u32
    }
}

/// A persisted progress entry: payload plus store-assigned identity.
///
/// Append-only; nothing in this core mutates or deletes entries once the
/// store has accepted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    id: EntryId,
    recorded_at: DateTime<Utc>,
    details: NewProgressEntry,
}

impl ProgressEntry {
    #[must_use]
    pub fn from_recorded(id: EntryId, recorded_at: DateTime<Utc>, details: NewProgressEntry) -> Self {
        Self {
            id,
            recorded_at,
            details,
        }
    }

    /// Rehydrate a progress entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the persisted counts fail validation.
    pub fn from_persisted(
        id: EntryId,
        recorded_at: DateTime<Utc>,
        category: Category,
        correct_answers: u32,
        total_questions: u32,
        time_taken_secs: u32,
        item_range: u32,
    ) -> Result<Self, ProgressError> {
        let details = NewProgressEntry::from_parts(
            category,
            correct_answers,
            total_questions,
            time_taken_secs,
            item_range,
        )?;
        Ok(Self::from_recorded(id, recorded_at, details))
    }

    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.details.category()
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.details.correct_answers()
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.details.total_questions()
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.details.time_taken_secs()
    }

    #[must_use]
    pub fn item_range(&self) -> u32 {
        self.details.item_range()
    }

    #[must_use]
    pub fn score_percent(&self) -> u32 {
        self.details.score_percent()
    }

    #[must_use]
    pub fn details(&self) -> &NewProgressEntry {
        &self.details
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn payload_validates_counts() {
        let err = NewProgressEntry::from_parts(Category::Numbers, 0, 0, 10, 10).unwrap_err();
        assert_eq!(err, ProgressError::NoQuestions);

        let err = NewProgressEntry::from_parts(Category::Numbers, 6, 5, 10, 10).unwrap_err();
        assert_eq!(
            err,
            ProgressError::CountMismatch {
                correct: 6,
                total: 5
            }
        );

        let err = NewProgressEntry::from_parts(Category::Numbers, 3, 5, 10, 0).unwrap_err();
        assert_eq!(err, ProgressError::EmptyItemRange);
    }

    #[test]
    fn score_percent_rounds() {
        let entry = NewProgressEntry::from_parts(Category::Numbers, 2, 3, 10, 10).unwrap();
        assert_eq!(entry.score_percent(), 67);

        let entry = NewProgressEntry::from_parts(Category::QuickMath, 1, 3, 10, 10).unwrap();
        assert_eq!(entry.score_percent(), 33);

        let entry = NewProgressEntry::from_parts(Category::Numbers, 5, 5, 10, 10).unwrap();
        assert_eq!(entry.score_percent(), 100);
    }

    #[test]
    fn persisted_entry_round_trips() {
        let now = fixed_now();
        let entry = ProgressEntry::from_persisted(7, now, Category::HebrewLetters, 3, 5, 42, 22)
            .unwrap();

        assert_eq!(entry.id(), 7);
        assert_eq!(entry.recorded_at(), now);
        assert_eq!(entry.category(), Category::HebrewLetters);
        assert_eq!(entry.correct_answers(), 3);
        assert_eq!(entry.total_questions(), 5);
        assert_eq!(entry.time_taken_secs(), 42);
        assert_eq!(entry.item_range(), 22);
        assert_eq!(entry.score_percent(), 60);
    }

    #[test]
    fn persisted_entry_rejects_bad_counts() {
        let err = ProgressEntry::from_persisted(1, fixed_now(), Category::Numbers, 9, 5, 0, 10)
            .unwrap_err();
        assert!(matches!(err, ProgressError::CountMismatch { .. }));
    }
}
