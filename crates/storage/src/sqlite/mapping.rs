use lamed_core::model::{AudioUri, Category, DrillItem, ItemId, ProgressEntry};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn item_id_from_i64(v: i64) -> Result<ItemId, StorageError> {
    Ok(ItemId::new(i64_to_u64("item_id", v)?))
}

pub(crate) fn item_id_to_i64(id: ItemId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("item_id overflow".into()))
}

pub(crate) fn parse_category(s: &str) -> Result<Category, StorageError> {
    s.parse::<Category>()
        .map_err(|_| StorageError::Serialization(format!("invalid category: {s}")))
}

pub(crate) fn map_item_row(row: &sqlx::sqlite::SqliteRow) -> Result<DrillItem, StorageError> {
    let id = item_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let category = parse_category(row.try_get::<String, _>("category").map_err(ser)?.as_str())?;
    let display_value: String = row.try_get("display_value").map_err(ser)?;
    let spoken_text: String = row.try_get("spoken_text").map_err(ser)?;
    let audio_uri = row
        .try_get::<Option<String>, _>("audio_url")
        .map_err(ser)?
        .map(AudioUri::parse)
        .transpose()
        .map_err(ser)?;

    DrillItem::new(id, category, display_value, spoken_text, audio_uri).map_err(ser)
}

pub(crate) fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressEntry, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let category = parse_category(row.try_get::<String, _>("category").map_err(ser)?.as_str())?;
    let recorded_at = row.try_get("recorded_at").map_err(ser)?;
    let correct_answers = u32_from_i64(
        "correct_answers",
        row.try_get::<i64, _>("correct_answers").map_err(ser)?,
    )?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let time_taken_secs = u32_from_i64(
        "time_taken_secs",
        row.try_get::<i64, _>("time_taken_secs").map_err(ser)?,
    )?;
    let item_range = u32_from_i64("item_range", row.try_get::<i64, _>("item_range").map_err(ser)?)?;

    ProgressEntry::from_persisted(
        id,
        recorded_at,
        category,
        correct_answers,
        total_questions,
        time_taken_secs,
        item_range,
    )
    .map_err(ser)
}
