use std::env;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use lamed_core::model::{
    AudioUri, Category, DrillItem, ItemId, NewProgressEntry, ProgressEntry,
};

use crate::error::ApiError;

/// Remote content/progress store configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("LAMED_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }
}

/// Typed client for the remote content/progress store.
///
/// Covers the documented surface: `GET /api/numbers`,
/// `GET /api/letters?type=`, `POST /api/progress`, `GET /api/progress?days=`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        ApiConfig::from_env().map(Self::new)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch the drill items for a category.
    ///
    /// Quick-math has no stored content and yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures, non-success statuses, or
    /// payloads that fail domain validation.
    pub async fn list_items(&self, category: Category) -> Result<Vec<DrillItem>, ApiError> {
        match category {
            Category::Numbers => {
                let dtos: Vec<NumberDto> = self.get_json(&self.url("/api/numbers")).await?;
                dtos.into_iter().map(item_from_number).collect()
            }
            Category::HebrewLetters => self.list_letters("hebrew").await,
            Category::EnglishLetters => self.list_letters("english").await,
            Category::QuickMath => Ok(Vec::new()),
        }
    }

    async fn list_letters(&self, kind: &str) -> Result<Vec<DrillItem>, ApiError> {
        let url = format!("{}?type={kind}", self.url("/api/letters"));
        let dtos: Vec<LetterDto> = self.get_json(&url).await?;
        dtos.into_iter().map(item_from_letter).collect()
    }

    /// Append a progress payload; the server assigns id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the server refuses the payload
    /// (HTTP 400), or other `ApiError` variants on transport/decoding
    /// failures.
    pub async fn record_progress(
        &self,
        entry: &NewProgressEntry,
    ) -> Result<ProgressEntry, ApiError> {
        let response = self
            .client
            .post(self.url("/api/progress"))
            .json(&ProgressPayloadDto::from_entry(entry))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message)
                .unwrap_or(body);
            return Err(ApiError::Rejected(detail));
        }
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }

        let dto: ProgressDto = response.json().await?;
        entry_from_dto(dto)
    }

    /// Fetch the trailing progress window, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures, non-success statuses, or
    /// payloads that fail domain validation.
    pub async fn recent_progress(&self, days: u32) -> Result<Vec<ProgressEntry>, ApiError> {
        let url = format!("{}?days={days}", self.url("/api/progress"));
        let dtos: Vec<ProgressDto> = self.get_json(&url).await?;
        dtos.into_iter().map(entry_from_dto).collect()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NumberDto {
    id: u64,
    value: u32,
    hebrew_text: String,
    audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LetterDto {
    id: u64,
    value: String,
    hebrew_text: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPayloadDto {
    correct_answers: u32,
    total_questions: u32,
    time_taken: u32,
    number_range: u32,
    content_type: String,
}

impl ProgressPayloadDto {
    fn from_entry(entry: &NewProgressEntry) -> Self {
        Self {
            correct_answers: entry.correct_answers(),
            total_questions: entry.total_questions(),
            time_taken: entry.time_taken_secs(),
            number_range: entry.item_range(),
            content_type: entry.category().as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDto {
    id: i64,
    date: DateTime<Utc>,
    correct_answers: u32,
    total_questions: u32,
    time_taken: u32,
    number_range: u32,
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn item_from_number(dto: NumberDto) -> Result<DrillItem, ApiError> {
    let audio_uri = dto
        .audio_url
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(AudioUri::parse)
        .transpose()
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    DrillItem::new(
        ItemId::new(dto.id),
        Category::Numbers,
        dto.value.to_string(),
        dto.hebrew_text,
        audio_uri,
    )
    .map_err(|e| ApiError::Decode(e.to_string()))
}

fn item_from_letter(dto: LetterDto) -> Result<DrillItem, ApiError> {
    let category = match dto.kind.as_str() {
        "hebrew" => Category::HebrewLetters,
        "english" => Category::EnglishLetters,
        other => return Err(ApiError::Decode(format!("unknown letter type: {other}"))),
    };

    DrillItem::new(
        ItemId::new(dto.id),
        category,
        dto.value,
        dto.hebrew_text,
        None,
    )
    .map_err(|e| ApiError::Decode(e.to_string()))
}

fn entry_from_dto(dto: ProgressDto) -> Result<ProgressEntry, ApiError> {
    let category = dto
        .content_type
        .as_deref()
        .unwrap_or("numbers")
        .parse::<Category>()
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    ProgressEntry::from_persisted(
        dto.id,
        dto.date,
        category,
        dto.correct_answers,
        dto.total_questions,
        dto.time_taken,
        dto.number_range,
    )
    .map_err(|e| ApiError::Decode(e.to_string()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_dto_maps_into_a_drill_item() {
        let dto: NumberDto = serde_json::from_value(serde_json::json!({
            "id": 3,
            "value": 3,
            "hebrewText": "שלוש",
            "audioUrl": "https://cdn.example.com/audio/3.mp3"
        }))
        .unwrap();

        let item = item_from_number(dto).unwrap();
        assert_eq!(item.id(), ItemId::new(3));
        assert_eq!(item.display_value(), "3");
        assert_eq!(item.spoken_text(), "שלוש");
        assert!(item.audio_uri().is_some());
    }

    #[test]
    fn letter_dto_maps_by_kind() {
        let dto: LetterDto = serde_json::from_value(serde_json::json!({
            "id": 21,
            "value": "א",
            "hebrewText": "אלף",
            "type": "hebrew"
        }))
        .unwrap();
        let item = item_from_letter(dto).unwrap();
        assert_eq!(item.category(), Category::HebrewLetters);

        let bad: LetterDto = serde_json::from_value(serde_json::json!({
            "id": 1,
            "value": "A",
            "hebrewText": "איי",
            "type": "cyrillic"
        }))
        .unwrap();
        assert!(matches!(item_from_letter(bad), Err(ApiError::Decode(_))));
    }

    #[test]
    fn progress_dto_defaults_to_numbers() {
        let dto: ProgressDto = serde_json::from_value(serde_json::json!({
            "id": 12,
            "date": "2023-11-14T22:13:20Z",
            "correctAnswers": 3,
            "totalQuestions": 5,
            "timeTaken": 40,
            "numberRange": 10
        }))
        .unwrap();

        let entry = entry_from_dto(dto).unwrap();
        assert_eq!(entry.category(), Category::Numbers);
        assert_eq!(entry.score_percent(), 60);
    }

    #[test]
    fn invalid_progress_counts_fail_decoding() {
        let dto: ProgressDto = serde_json::from_value(serde_json::json!({
            "id": 12,
            "date": "2023-11-14T22:13:20Z",
            "correctAnswers": 9,
            "totalQuestions": 5,
            "timeTaken": 40,
            "numberRange": 10,
            "contentType": "quick-math"
        }))
        .unwrap();

        assert!(matches!(entry_from_dto(dto), Err(ApiError::Decode(_))));
    }

    #[test]
    fn payload_serializes_with_wire_names() {
        let entry = NewProgressEntry::from_parts(Category::HebrewLetters, 3, 5, 40, 22).unwrap();
        let value = serde_json::to_value(ProgressPayloadDto::from_entry(&entry)).unwrap();

        assert_eq!(value["correctAnswers"], 3);
        assert_eq!(value["totalQuestions"], 5);
        assert_eq!(value["timeTaken"], 40);
        assert_eq!(value["numberRange"], 22);
        assert_eq!(value["contentType"], "hebrew-letters");
    }
}
