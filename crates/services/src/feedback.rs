use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::sessions::AnswerOutcome;

/// Banner auto-hide delay on the practice screens.
pub const FEEDBACK_HIDE_DELAY: Duration = Duration::from_secs(2);

/// Quick-math runs on a tighter cadence.
pub const QUICK_MATH_HIDE_DELAY: Duration = Duration::from_secs(1);

/// The transient feedback a practice screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    Hidden,
    Correct,
    /// Wrong answer; `detail` is the spoken name of the chosen item.
    Incorrect {
        detail: String,
    },
}

struct FeedbackState {
    generation: u64,
    visible: Feedback,
}

/// Owns the success/failure banner and its single-shot auto-hide timer.
///
/// At most one banner is visible and at most one timer is armed. Showing a
/// new banner replaces the visible one and disarms the pending hide, so
/// banners never stack and a stale timer never hides a newer banner. The
/// timer is also disarmed on [`clear`](Self::clear) and on drop.
///
/// Must be used inside a Tokio runtime.
pub struct FeedbackSequencer {
    state: Arc<Mutex<FeedbackState>>,
    hide_delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl FeedbackSequencer {
    #[must_use]
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedbackState {
                generation: 0,
                visible: Feedback::Hidden,
            })),
            hide_delay,
            pending: None,
        }
    }

    /// Show the success banner and arm its auto-hide.
    pub fn show_correct(&mut self) {
        self.arm(Feedback::Correct);
    }

    /// Show the failure banner for the chosen item and arm its auto-hide.
    pub fn show_incorrect(&mut self, detail: impl Into<String>) {
        self.arm(Feedback::Incorrect {
            detail: detail.into(),
        });
    }

    /// Map an answer outcome onto the banner. Ignored answers leave the
    /// current state alone.
    pub fn apply(&mut self, outcome: &AnswerOutcome) {
        match outcome {
            AnswerOutcome::Correct { .. } => self.show_correct(),
            AnswerOutcome::Incorrect { chosen } => {
                let detail = chosen
                    .as_ref()
                    .map(|item| item.spoken_text().to_string())
                    .unwrap_or_default();
                self.show_incorrect(detail);
            }
            AnswerOutcome::Ignored => {}
        }
    }

    /// The feedback currently visible.
    #[must_use]
    pub fn current(&self) -> Feedback {
        self.state
            .lock()
            .map(|guard| guard.visible.clone())
            .unwrap_or_default()
    }

    /// Hide any banner and disarm the pending timer.
    pub fn clear(&mut self) {
        self.disarm();
        if let Ok(mut guard) = self.state.lock() {
            guard.generation += 1;
            guard.visible = Feedback::Hidden;
        }
    }

    fn arm(&mut self, next: Feedback) {
        self.disarm();

        let generation = match self.state.lock() {
            Ok(mut guard) => {
                guard.generation += 1;
                guard.visible = next;
                guard.generation
            }
            Err(_) => return,
        };

        let state = Arc::clone(&self.state);
        let delay = self.hide_delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut guard) = state.lock() {
                // A newer banner owns the state now; leave it alone.
                if guard.generation == generation {
                    guard.visible = Feedback::Hidden;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for FeedbackSequencer {
    fn drop(&mut self) {
        self.disarm();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
