use lamed_core::model::{Category, DrillItem, Question};

use crate::error::GeneratorError;
use crate::generator::QuestionGenerator;
use crate::math::{self, MathProblem};

/// Supplies questions for one practice session.
///
/// The session tracker drives whichever source it was started with; the
/// source decides where questions come from and what the round looks like.
pub trait QuestionSource: Send {
    /// Category the produced questions belong to.
    fn category(&self) -> Category;

    /// Size of the drilled item range, recorded with progress entries.
    fn item_range(&self) -> u32;

    /// Produce the next question.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if a question cannot be built.
    fn next_question(&mut self) -> Result<Question, GeneratorError>;

    /// Presentation prompt for the current round, when the question alone is
    /// not enough. Pool drills derive their prompt from the target; the
    /// quick-math source supplies the problem statement.
    fn round_prompt(&self) -> Option<String> {
        None
    }
}

/// Drill-item pool source backing the numbers and letters screens.
pub struct PoolQuestionSource {
    category: Category,
    pool: Vec<DrillItem>,
    generator: QuestionGenerator,
}

impl PoolQuestionSource {
    /// A pool smaller than four items is accepted here; the first
    /// `next_question` call reports it so session start fails cleanly.
    #[must_use]
    pub fn new(category: Category, pool: Vec<DrillItem>) -> Self {
        Self {
            category,
            pool,
            generator: QuestionGenerator::new(),
        }
    }
}

impl QuestionSource for PoolQuestionSource {
    fn category(&self) -> Category {
        self.category
    }

    #[allow(clippy::cast_possible_truncation)]
    fn item_range(&self) -> u32 {
        self.pool.len() as u32
    }

    fn next_question(&mut self) -> Result<Question, GeneratorError> {
        self.generator.next(&self.pool)
    }
}

/// Endless arithmetic source for the quick-math game.
#[derive(Default)]
pub struct MathQuestionSource {
    current: Option<MathProblem>,
}

impl MathQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The problem behind the current question, once one has been drawn.
    #[must_use]
    pub fn current_problem(&self) -> Option<&MathProblem> {
        self.current.as_ref()
    }
}

impl QuestionSource for MathQuestionSource {
    fn category(&self) -> Category {
        Category::QuickMath
    }

    fn item_range(&self) -> u32 {
        math::OPERAND_MAX
    }

    fn next_question(&mut self) -> Result<Question, GeneratorError> {
        let problem = MathProblem::generate();
        let question = problem.to_question()?;
        self.current = Some(problem);
        Ok(question)
    }

    fn round_prompt(&self) -> Option<String> {
        self.current.map(|problem| problem.to_string())
    }
}
