#![forbid(unsafe_code)]

pub mod api;
pub mod audio;
pub mod dashboard;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod math;
pub mod sessions;

pub use lamed_core::Clock;

pub use error::{ApiError, DashboardError, GeneratorError, SessionError};

pub use api::{ApiClient, ApiConfig};
pub use audio::{AudioCues, NullAudioCues, SoundCue, SpeechLang};
pub use dashboard::{AggregateReport, DashboardService};
pub use feedback::{Feedback, FeedbackSequencer};
pub use generator::QuestionGenerator;

pub use sessions::{
    AnswerOutcome, PracticeLoopService, PracticeSession, SessionAnswerResult, SessionConfig,
};
