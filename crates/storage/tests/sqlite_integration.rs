use chrono::Duration;
use lamed_core::model::{AudioUri, Category, DrillItem, ItemId, NewProgressEntry};
use lamed_core::time::fixed_now;
use storage::repository::{ItemRepository, ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;

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

#[tokio::test]
async fn sqlite_round_trips_items_by_category() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_items?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let with_audio = DrillItem::new(
        ItemId::new(1),
        Category::Numbers,
        "1",
        "אחת",
        Some(AudioUri::parse("https://cdn.example.com/audio/1.mp3").unwrap()),
    )
    .unwrap();
    repo.upsert_item(&with_audio).await.unwrap();
    repo.upsert_item(&build_item(2, Category::Numbers))
        .await
        .unwrap();
    repo.upsert_item(&build_item(3, Category::HebrewLetters))
        .await
        .unwrap();

    let numbers = repo.list_items(Category::Numbers).await.expect("list");
    assert_eq!(numbers.len(), 2);
    assert_eq!(numbers[0], with_audio);
    assert_eq!(
        numbers[0].audio_uri().map(AudioUri::as_str),
        Some("https://cdn.example.com/audio/1.mp3")
    );

    let fetched = repo.get_item(ItemId::new(3)).await.unwrap();
    assert_eq!(fetched.map(|item| item.category()), Some(Category::HebrewLetters));
    assert!(repo.get_item(ItemId::new(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_upsert_overwrites_mutable_fields() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_item(&build_item(1, Category::EnglishLetters))
        .await
        .unwrap();
    let updated =
        DrillItem::new(ItemId::new(1), Category::EnglishLetters, "A", "איי", None).unwrap();
    repo.upsert_item(&updated).await.unwrap();

    let listed = repo.list_items(Category::EnglishLetters).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].display_value(), "A");
}

#[tokio::test]
async fn sqlite_progress_window_is_sorted_descending() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let now = fixed_now();
    let payload = |correct: u32| {
        NewProgressEntry::from_parts(Category::Numbers, correct, 5, 30, 20).unwrap()
    };

    let old = repo
        .record_progress(&payload(1), now - Duration::days(10))
        .await
        .unwrap();
    let mid = repo
        .record_progress(&payload(2), now - Duration::days(2))
        .await
        .unwrap();
    let fresh = repo.record_progress(&payload(3), now).await.unwrap();

    let recent = repo.list_since(now - Duration::days(7)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id(), fresh.id());
    assert_eq!(recent[1].id(), mid.id());

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id(), old.id());

    let fetched = repo.get_entry(mid.id()).await.unwrap();
    assert_eq!(fetched, mid);

    let err = repo.get_entry(9_999).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
