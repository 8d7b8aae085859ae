use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lamed_core::model::{Category, DrillItem, EntryId, ItemId, NewProgressEntry, ProgressEntry};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid progress payload: {0}")]
    Validation(String),
}

/// Repository contract for drillable content.
///
/// Items are read wholesale at session start; writes exist for seeding and
/// content management, not for gameplay.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// List every item in a category, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the items cannot be read.
    async fn list_items(&self, category: Category) -> Result<Vec<DrillItem>, StorageError>;

    /// Fetch a single item by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures. A missing item is `Ok(None)`.
    async fn get_item(&self, id: ItemId) -> Result<Option<DrillItem>, StorageError>;

    /// Persist or update an item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the item cannot be stored.
    async fn upsert_item(&self, item: &DrillItem) -> Result<(), StorageError>;
}

/// Repository contract for the append-only practice history.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a progress payload; the store assigns id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Validation` for payloads the store must refuse,
    /// or other storage errors.
    async fn record_progress(
        &self,
        entry: &NewProgressEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError>;

    /// List entries recorded at or after `from`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    async fn list_since(&self, from: DateTime<Utc>) -> Result<Vec<ProgressEntry>, StorageError>;

    /// List the full history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    async fn list_all(&self) -> Result<Vec<ProgressEntry>, StorageError>;

    /// Fetch a single entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_entry(&self, id: EntryId) -> Result<ProgressEntry, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<Mutex<Vec<DrillItem>>>,
    entries: Arc<Mutex<Vec<ProgressEntry>>>,
    next_entry_id: Arc<Mutex<EntryId>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            entries: Arc::new(Mutex::new(Vec::new())),
            next_entry_id: Arc::new(Mutex::new(1)),
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn list_items(&self, category: Category) -> Result<Vec<DrillItem>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|item| item.category() == category)
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<DrillItem>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|item| item.id() == id).cloned())
    }

    async fn upsert_item(&self, item: &DrillItem) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter().position(|stored| stored.id() == item.id()) {
            Some(index) => guard[index] = item.clone(),
            None => guard.push(item.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn record_progress(
        &self,
        entry: &NewProgressEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError> {
        let mut next_id = self
            .next_entry_id
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = *next_id;
        *next_id += 1;

        let recorded = ProgressEntry::from_recorded(id, recorded_at, entry.clone());
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(recorded.clone());
        Ok(recorded)
    }

    async fn list_since(&self, from: DateTime<Utc>) -> Result<Vec<ProgressEntry>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut recent: Vec<_> = guard
            .iter()
            .filter(|entry| entry.recorded_at() >= from)
            .cloned()
            .collect();
        recent.sort_by_key(|entry| std::cmp::Reverse((entry.recorded_at(), entry.id())));
        Ok(recent)
    }

    async fn list_all(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut all: Vec<_> = guard.clone();
        all.sort_by_key(|entry| std::cmp::Reverse((entry.recorded_at(), entry.id())));
        Ok(all)
    }

    async fn get_entry(&self, id: EntryId) -> Result<ProgressEntry, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|entry| entry.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates content and progress repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn ItemRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let items: Arc<dyn ItemRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { items, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lamed_core::time::fixed_now;

    fn build_item(id: u64, category: Category) -> DrillItem {
        DrillItem::new(
            ItemId::new(id),
            category,
            format!("item {id}"),
            format!("spoken {id}"),
            None,
        )
        .unwrap()
    }

    fn build_payload(correct: u32, total: u32) -> NewProgressEntry {
        NewProgressEntry::from_parts(Category::Numbers, correct, total, 30, 20).unwrap()
    }

    #[tokio::test]
    async fn items_round_trip_by_category() {
        let repo = InMemoryRepository::new();
        repo.upsert_item(&build_item(1, Category::Numbers))
            .await
            .unwrap();
        repo.upsert_item(&build_item(2, Category::Numbers))
            .await
            .unwrap();
        repo.upsert_item(&build_item(3, Category::HebrewLetters))
            .await
            .unwrap();

        let numbers = repo.list_items(Category::Numbers).await.unwrap();
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[0].id(), ItemId::new(1));

        let letters = repo.list_items(Category::HebrewLetters).await.unwrap();
        assert_eq!(letters.len(), 1);

        let fetched = repo.get_item(ItemId::new(2)).await.unwrap();
        assert_eq!(fetched.map(|item| item.id()), Some(ItemId::new(2)));
        assert!(repo.get_item(ItemId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_item() {
        let repo = InMemoryRepository::new();
        repo.upsert_item(&build_item(1, Category::Numbers))
            .await
            .unwrap();

        let updated = DrillItem::new(ItemId::new(1), Category::Numbers, "one", "אחת", None).unwrap();
        repo.upsert_item(&updated).await.unwrap();

        let listed = repo.list_items(Category::Numbers).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].display_value(), "one");
    }

    #[tokio::test]
    async fn progress_is_appended_with_fresh_ids() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();

        let first = repo
            .record_progress(&build_payload(3, 5), now)
            .await
            .unwrap();
        let second = repo
            .record_progress(&build_payload(4, 5), now + Duration::minutes(1))
            .await
            .unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(first.correct_answers(), 3);

        let fetched = repo.get_entry(second.id()).await.unwrap();
        assert_eq!(fetched, second);
    }

    #[tokio::test]
    async fn list_since_filters_and_sorts_descending() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();

        repo.record_progress(&build_payload(1, 5), now - Duration::days(10))
            .await
            .unwrap();
        repo.record_progress(&build_payload(2, 5), now - Duration::days(2))
            .await
            .unwrap();
        repo.record_progress(&build_payload(3, 5), now)
            .await
            .unwrap();

        let recent = repo.list_since(now - Duration::days(7)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].correct_answers(), 3);
        assert_eq!(recent[1].correct_answers(), 2);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].correct_answers(), 1);
    }
}
