use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::item::DrillItem;

/// Number of answer choices shown for every question.
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected {expected} choices, got {got}")]
    WrongChoiceCount { expected: usize, got: usize },

    #[error("duplicate choice id: {0}")]
    DuplicateChoice(ItemId),

    #[error("target {0} is not among the choices")]
    TargetMissing(ItemId),
}

/// One multiple-choice round: a target item and four shuffled choices.
///
/// Questions live for a single round and are never persisted. The
/// constructor enforces the shape so downstream code can rely on it:
/// exactly [`CHOICE_COUNT`] choices with unique ids, the target among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    target: DrillItem,
    choices: Vec<DrillItem>,
}

impl Question {
    /// Assemble a question from a target and its ordered choices.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the choice count is wrong, a choice id
    /// repeats, or the target is missing from the choices.
    pub fn from_parts(target: DrillItem, choices: Vec<DrillItem>) -> Result<Self, QuestionError> {
        if choices.len() != CHOICE_COUNT {
            return Err(QuestionError::WrongChoiceCount {
                expected: CHOICE_COUNT,
                got: choices.len(),
            });
        }

        for (index, choice) in choices.iter().enumerate() {
            if choices[..index].iter().any(|seen| seen.id() == choice.id()) {
                return Err(QuestionError::DuplicateChoice(choice.id()));
            }
        }

        if !choices.iter().any(|choice| choice.id() == target.id()) {
            return Err(QuestionError::TargetMissing(target.id()));
        }

        Ok(Self { target, choices })
    }

    #[must_use]
    pub fn target(&self) -> &DrillItem {
        &self.target
    }

    #[must_use]
    pub fn choices(&self) -> &[DrillItem] {
        &self.choices
    }

    /// True if the given choice id is the target.
    #[must_use]
    pub fn is_correct(&self, choice_id: ItemId) -> bool {
        self.target.id() == choice_id
    }

    /// Look up a choice by id, if present.
    #[must_use]
    pub fn choice(&self, choice_id: ItemId) -> Option<&DrillItem> {
        self.choices.iter().find(|choice| choice.id() == choice_id)
    }
}
