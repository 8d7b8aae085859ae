mod source;
mod tracker;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use source::{MathQuestionSource, PoolQuestionSource, QuestionSource};
pub use tracker::{
    AnswerOutcome, PERSIST_EVERY, PracticeSession, SessionConfig, SessionPhase,
};
pub use workflow::{PracticeLoopService, SessionAnswerResult};
