use rand::rng;
use rand::seq::SliceRandom;

use lamed_core::model::{CHOICE_COUNT, DrillItem, ItemId, Question};

use crate::error::GeneratorError;

/// Builds randomized multiple-choice questions from a drill-item pool.
///
/// Selection is uniform: a fresh shuffle of the pool picks the target and
/// three distinct distractors, and the four choices are shuffled again so
/// the target's slot carries no signal. Every call draws fresh entropy;
/// questions are not reproducible across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionGenerator;

impl QuestionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Produce the next question from the pool.
    ///
    /// Consecutive repeats of the same target are allowed; use
    /// [`next_excluding`](Self::next_excluding) to suppress them.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InsufficientPool` if the pool has fewer than
    /// [`CHOICE_COUNT`] items.
    pub fn next(&self, pool: &[DrillItem]) -> Result<Question, GeneratorError> {
        self.next_excluding(pool, None)
    }

    /// Produce the next question, skipping `exclude` as a target candidate.
    ///
    /// The exclusion only applies while the pool is large enough to spare an
    /// item; with exactly [`CHOICE_COUNT`] items it is ignored rather than
    /// making the session unplayable.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InsufficientPool` if the pool has fewer than
    /// [`CHOICE_COUNT`] items.
    pub fn next_excluding(
        &self,
        pool: &[DrillItem],
        exclude: Option<ItemId>,
    ) -> Result<Question, GeneratorError> {
        if pool.len() < CHOICE_COUNT {
            return Err(GeneratorError::InsufficientPool {
                len: pool.len(),
                needed: CHOICE_COUNT,
            });
        }

        let mut candidates: Vec<&DrillItem> = pool.iter().collect();
        let mut rng = rng();
        candidates.shuffle(&mut rng);

        let target = match exclude {
            Some(skip) if candidates.len() > CHOICE_COUNT => candidates
                .iter()
                .find(|item| item.id() != skip)
                .copied()
                .cloned(),
            _ => candidates.first().copied().cloned(),
        };
        let Some(target) = target else {
            return Err(GeneratorError::InsufficientPool {
                len: pool.len(),
                needed: CHOICE_COUNT,
            });
        };

        let mut choices: Vec<DrillItem> = vec![target.clone()];
        choices.extend(
            candidates
                .iter()
                .filter(|item| item.id() != target.id())
                .take(CHOICE_COUNT - 1)
                .map(|item| (*item).clone()),
        );
        choices.shuffle(&mut rng);

        Ok(Question::from_parts(target, choices)?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lamed_core::model::Category;
    use std::collections::HashSet;

    fn build_pool(len: u64) -> Vec<DrillItem> {
        (1..=len)
            .map(|id| {
                DrillItem::new(
                    ItemId::new(id),
                    Category::Numbers,
                    id.to_string(),
                    format!("spoken {id}"),
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn question_has_four_unique_choices_including_target() {
        let pool = build_pool(10);
        let generator = QuestionGenerator::new();

        for _ in 0..50 {
            let question = generator.next(&pool).unwrap();
            let ids: HashSet<_> = question.choices().iter().map(DrillItem::id).collect();
            assert_eq!(ids.len(), CHOICE_COUNT);
            assert!(ids.contains(&question.target().id()));
        }
    }

    #[test]
    fn minimal_pool_still_produces_a_question() {
        let pool = build_pool(4);
        let question = QuestionGenerator::new().next(&pool).unwrap();
        assert_eq!(question.choices().len(), CHOICE_COUNT);
    }

    #[test]
    fn short_pool_is_rejected() {
        let pool = build_pool(3);
        let err = QuestionGenerator::new().next(&pool).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::InsufficientPool {
                len: 3,
                needed: CHOICE_COUNT
            }
        );
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = QuestionGenerator::new().next(&[]).unwrap_err();
        assert!(matches!(err, GeneratorError::InsufficientPool { len: 0, .. }));
    }

    #[test]
    fn exclusion_suppresses_the_previous_target() {
        let pool = build_pool(10);
        let generator = QuestionGenerator::new();
        let skip = ItemId::new(5);

        for _ in 0..50 {
            let question = generator.next_excluding(&pool, Some(skip)).unwrap();
            assert_ne!(question.target().id(), skip);
        }
    }

    #[test]
    fn exclusion_is_ignored_on_a_minimal_pool() {
        let pool = build_pool(4);
        let generator = QuestionGenerator::new();

        // With only four items the excluded target must stay eligible.
        let mut saw_excluded = false;
        for _ in 0..200 {
            let question = generator.next_excluding(&pool, Some(ItemId::new(1))).unwrap();
            if question.target().id() == ItemId::new(1) {
                saw_excluded = true;
                break;
            }
        }
        assert!(saw_excluded);
    }
}
