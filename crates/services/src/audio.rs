use lamed_core::model::Category;

/// Voice hint for the speech collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechLang {
    Hebrew,
    English,
}

impl SpeechLang {
    /// Voice used when reading targets of the given category aloud.
    #[must_use]
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::EnglishLetters => SpeechLang::English,
            Category::Numbers | Category::HebrewLetters | Category::QuickMath => SpeechLang::Hebrew,
        }
    }
}

/// Transient sound effects played on answer outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Success,
    Failure,
}

/// Fire-and-forget audio collaborator: text-to-speech and sound effects.
///
/// Implementations must return promptly and must not surface failures to the
/// caller; a missed sound never interrupts play.
pub trait AudioCues: Send + Sync {
    fn speak(&self, text: &str, lang: SpeechLang);
    fn play(&self, cue: SoundCue);
}

/// Silent collaborator for headless and test use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudioCues;

impl AudioCues for NullAudioCues {
    fn speak(&self, _text: &str, _lang: SpeechLang) {}
    fn play(&self, _cue: SoundCue) {}
}
