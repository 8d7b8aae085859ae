use std::fmt;

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use lamed_core::model::{CHOICE_COUNT, Category, DrillItem, ItemId, Question};

use crate::error::GeneratorError;

/// Largest operand in a quick-math problem.
pub const OPERAND_MAX: u32 = 10;

/// Length of one quick-math game.
pub const GAME_SECS: u32 = 60;

/// How far distractor answers may stray from the correct one.
const DISTRACTOR_SPREAD: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
}

impl MathOp {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            MathOp::Add => '+',
            MathOp::Sub => '-',
        }
    }
}

/// One arithmetic round: `left op right = ?`.
///
/// Operands stay in `1..=OPERAND_MAX` and subtraction operands are swapped
/// so the answer never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathProblem {
    left: u32,
    right: u32,
    op: MathOp,
}

impl MathProblem {
    /// Draw a fresh problem.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rng();
        let a = rng.random_range(1..=OPERAND_MAX);
        let b = rng.random_range(1..=OPERAND_MAX);
        let op = if rng.random_bool(0.5) {
            MathOp::Add
        } else {
            MathOp::Sub
        };
        let (left, right) = if op == MathOp::Sub && a < b {
            (b, a)
        } else {
            (a, b)
        };

        Self { left, right, op }
    }

    #[must_use]
    pub fn left(&self) -> u32 {
        self.left
    }

    #[must_use]
    pub fn right(&self) -> u32 {
        self.right
    }

    #[must_use]
    pub fn op(&self) -> MathOp {
        self.op
    }

    #[must_use]
    pub fn answer(&self) -> u32 {
        match self.op {
            MathOp::Add => self.left + self.right,
            MathOp::Sub => self.left - self.right,
        }
    }

    /// Build the four-choice question for this problem.
    ///
    /// Choices are candidate answers: the correct one plus three distinct
    /// distractors within `DISTRACTOR_SPREAD` of it, never negative. Each
    /// candidate becomes a synthetic quick-math item whose id is its value.
    ///
    /// # Errors
    ///
    /// Propagates question-shape validation failures.
    pub fn to_question(&self) -> Result<Question, GeneratorError> {
        let answer = i64::from(self.answer());
        let mut rng = rng();

        let mut values = vec![answer];
        while values.len() < CHOICE_COUNT {
            let offset = rng.random_range(1..=DISTRACTOR_SPREAD);
            let candidate = if rng.random_bool(0.5) {
                answer + offset
            } else {
                answer - offset
            };
            if candidate >= 0 && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        values.shuffle(&mut rng);

        let choices = values
            .iter()
            .map(|value| answer_item(*value))
            .collect::<Result<Vec<_>, _>>()?;
        let target = answer_item(answer)?;

        Ok(Question::from_parts(target, choices)?)
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.left, self.op.symbol(), self.right)
    }
}

/// Candidate answers are non-negative by construction; the value doubles as
/// the synthetic item id.
#[allow(clippy::cast_sign_loss)]
fn answer_item(value: i64) -> Result<DrillItem, GeneratorError> {
    let item = DrillItem::new(
        ItemId::new(value as u64),
        Category::QuickMath,
        value.to_string(),
        value.to_string(),
        None,
    )?;
    Ok(item)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn problems_never_go_negative() {
        for _ in 0..200 {
            let problem = MathProblem::generate();
            assert!(problem.left() >= 1 && problem.left() <= OPERAND_MAX);
            assert!(problem.right() >= 1 && problem.right() <= OPERAND_MAX);
            if problem.op() == MathOp::Sub {
                assert!(problem.left() >= problem.right());
            }
        }
    }

    #[test]
    fn question_offers_the_answer_among_distinct_choices() {
        for _ in 0..100 {
            let problem = MathProblem::generate();
            let question = problem.to_question().unwrap();

            let values: HashSet<u64> = question
                .choices()
                .iter()
                .map(|choice| choice.id().value())
                .collect();
            assert_eq!(values.len(), CHOICE_COUNT);
            assert!(values.contains(&u64::from(problem.answer())));
            assert!(question.is_correct(question.target().id()));
        }
    }

    #[test]
    fn prompt_reads_like_a_problem() {
        let problem = MathProblem {
            left: 7,
            right: 3,
            op: MathOp::Sub,
        };
        assert_eq!(problem.to_string(), "7 - 3 = ?");
        assert_eq!(problem.answer(), 4);
    }
}
