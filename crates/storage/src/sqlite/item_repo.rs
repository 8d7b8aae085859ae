use lamed_core::model::{AudioUri, Category, DrillItem, ItemId};

use super::{
    SqliteRepository,
    mapping::{item_id_to_i64, map_item_row},
};
use crate::repository::{ItemRepository, StorageError};

#[async_trait::async_trait]
impl ItemRepository for SqliteRepository {
    async fn list_items(&self, category: Category) -> Result<Vec<DrillItem>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, category, display_value, spoken_text, audio_url
                FROM drill_items
                WHERE category = ?1
                ORDER BY id ASC
            ",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_item_row(&row)?);
        }
        Ok(out)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<DrillItem>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, category, display_value, spoken_text, audio_url
                FROM drill_items
                WHERE id = ?1
            ",
        )
        .bind(item_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_item_row).transpose()
    }

    async fn upsert_item(&self, item: &DrillItem) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO drill_items (id, category, display_value, spoken_text, audio_url)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    category = excluded.category,
                    display_value = excluded.display_value,
                    spoken_text = excluded.spoken_text,
                    audio_url = excluded.audio_url
            ",
        )
        .bind(item_id_to_i64(item.id())?)
        .bind(item.category().as_str())
        .bind(item.display_value().to_owned())
        .bind(item.spoken_text().to_owned())
        .bind(item.audio_uri().map(AudioUri::as_str).map(str::to_owned))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
