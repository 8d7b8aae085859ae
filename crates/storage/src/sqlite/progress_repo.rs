use chrono::{DateTime, Utc};
use lamed_core::model::{EntryId, NewProgressEntry, ProgressEntry};

use super::{SqliteRepository, mapping::map_entry_row};
use crate::repository::{ProgressRepository, StorageError};

const ENTRY_COLUMNS: &str = r"
    id, category, recorded_at, correct_answers,
    total_questions, time_taken_secs, item_range
";

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn record_progress(
        &self,
        entry: &NewProgressEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO progress_entries (
                    category, recorded_at, correct_answers,
                    total_questions, time_taken_secs, item_range
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(entry.category().as_str())
        .bind(recorded_at)
        .bind(i64::from(entry.correct_answers()))
        .bind(i64::from(entry.total_questions()))
        .bind(i64::from(entry.time_taken_secs()))
        .bind(i64::from(entry.item_range()))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // CHECK constraint failures mean the payload violates the schema
            // contract rather than the connection failing.
            sqlx::Error::Database(db) if db.message().contains("CHECK constraint failed") => {
                StorageError::Validation(db.message().to_string())
            }
            other => StorageError::Connection(other.to_string()),
        })?;

        Ok(ProgressEntry::from_recorded(
            res.last_insert_rowid(),
            recorded_at,
            entry.clone(),
        ))
    }

    async fn list_since(&self, from: DateTime<Utc>) -> Result<Vec<ProgressEntry>, StorageError> {
        let sql = format!(
            r"
                SELECT {ENTRY_COLUMNS}
                FROM progress_entries
                WHERE recorded_at >= ?1
                ORDER BY recorded_at DESC, id DESC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(from)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_entry_row(&row)?);
        }
        Ok(out)
    }

    async fn list_all(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        let sql = format!(
            r"
                SELECT {ENTRY_COLUMNS}
                FROM progress_entries
                ORDER BY recorded_at DESC, id DESC
            "
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_entry_row(&row)?);
        }
        Ok(out)
    }

    async fn get_entry(&self, id: EntryId) -> Result<ProgressEntry, StorageError> {
        let sql = format!(
            r"
                SELECT {ENTRY_COLUMNS}
                FROM progress_entries
                WHERE id = ?1
            "
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        map_entry_row(&row)
    }
}
