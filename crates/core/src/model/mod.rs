mod ids;
mod item;
mod progress;
mod question;

pub use ids::{ItemId, ParseIdError};

pub use item::{AudioUri, Category, DrillItem, ItemError};
pub use progress::{EntryId, NewProgressEntry, ProgressEntry, ProgressError};
pub use question::{CHOICE_COUNT, Question, QuestionError};
