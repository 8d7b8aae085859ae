use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::ItemId;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

/// Errors that can occur when constructing drill items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("Display value cannot be empty.")]
    EmptyDisplayValue,

    #[error("Spoken text cannot be empty.")]
    EmptySpokenText,

    #[error("Audio URI cannot be empty or malformed.")]
    InvalidAudioUri,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// The four drill categories the app teaches.
///
/// The string forms (`numbers`, `hebrew-letters`, `english-letters`,
/// `quick-math`) are the storage and API encoding and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Numbers,
    HebrewLetters,
    EnglishLetters,
    QuickMath,
}

impl Category {
    /// All categories, in dashboard display order.
    pub const ALL: [Category; 4] = [
        Category::Numbers,
        Category::HebrewLetters,
        Category::EnglishLetters,
        Category::QuickMath,
    ];

    /// Stable string form used by storage and the API surface.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Numbers => "numbers",
            Category::HebrewLetters => "hebrew-letters",
            Category::EnglishLetters => "english-letters",
            Category::QuickMath => "quick-math",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numbers" => Ok(Category::Numbers),
            "hebrew-letters" => Ok(Category::HebrewLetters),
            "english-letters" => Ok(Category::EnglishLetters),
            "quick-math" => Ok(Category::QuickMath),
            other => Err(ItemError::UnknownCategory(other.to_string())),
        }
    }
}

//
// ─── AUDIO URI ─────────────────────────────────────────────────────────────────
//

/// Location of the pre-recorded pronunciation clip for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUri(Url);

impl AudioUri {
    /// Parse and validate an audio URL.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::InvalidAudioUri` if the string is empty or not a URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ItemError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(ItemError::InvalidAudioUri);
        }
        let url = Url::parse(s).map_err(|_| ItemError::InvalidAudioUri)?;
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AudioUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── DRILL ITEM ────────────────────────────────────────────────────────────────
//

/// One drillable piece of content: a number, Hebrew letter, or English letter.
///
/// Items are immutable and sourced wholesale from the content store at
/// session start. `display_value` is what the card shows; `spoken_text` is
/// what the speech collaborator reads aloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillItem {
    id: ItemId,
    category: Category,
    display_value: String,
    spoken_text: String,
    audio_uri: Option<AudioUri>,
}

impl DrillItem {
    /// Build a validated drill item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the display value or spoken text is empty.
    pub fn new(
        id: ItemId,
        category: Category,
        display_value: impl Into<String>,
        spoken_text: impl Into<String>,
        audio_uri: Option<AudioUri>,
    ) -> Result<Self, ItemError> {
        let display_value = display_value.into();
        if display_value.trim().is_empty() {
            return Err(ItemError::EmptyDisplayValue);
        }
        let spoken_text = spoken_text.into();
        if spoken_text.trim().is_empty() {
            return Err(ItemError::EmptySpokenText);
        }

        Ok(Self {
            id,
            category,
            display_value,
            spoken_text,
            audio_uri,
        })
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    #[must_use]
    pub fn spoken_text(&self) -> &str {
        &self.spoken_text
    }

    #[must_use]
    pub fn audio_uri(&self) -> Option<&AudioUri> {
        self.audio_uri.as_ref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_string_forms_round_trip() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "colors".parse::<Category>().unwrap_err();
        assert!(matches!(err, ItemError::UnknownCategory(_)));
    }

    #[test]
    fn item_requires_display_value() {
        let err = DrillItem::new(ItemId::new(1), Category::Numbers, "  ", "אחת", None).unwrap_err();
        assert_eq!(err, ItemError::EmptyDisplayValue);
    }

    #[test]
    fn item_requires_spoken_text() {
        let err = DrillItem::new(ItemId::new(1), Category::Numbers, "1", "", None).unwrap_err();
        assert_eq!(err, ItemError::EmptySpokenText);
    }

    #[test]
    fn audio_uri_rejects_garbage() {
        assert!(AudioUri::parse("").is_err());
        assert!(AudioUri::parse("not a url").is_err());
        let uri = AudioUri::parse("https://cdn.example.com/audio/alef.mp3").unwrap();
        assert_eq!(uri.as_str(), "https://cdn.example.com/audio/alef.mp3");
    }

    #[test]
    fn item_carries_its_fields() {
        let uri = AudioUri::parse("https://cdn.example.com/audio/1.mp3").unwrap();
        let item = DrillItem::new(
            ItemId::new(3),
            Category::Numbers,
            "3",
            "שלוש",
            Some(uri.clone()),
        )
        .unwrap();

        assert_eq!(item.id(), ItemId::new(3));
        assert_eq!(item.category(), Category::Numbers);
        assert_eq!(item.display_value(), "3");
        assert_eq!(item.spoken_text(), "שלוש");
        assert_eq!(item.audio_uri(), Some(&uri));
    }
}
