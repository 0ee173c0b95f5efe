use serde_json::json;

use super::*;
use crate::store::{JsonFileStore, MemoryStore};

fn draft(value: serde_json::Value) -> Draft {
    Draft::from_value(value)
}

fn valid(title: &str) -> Draft {
    draft(json!({
        "title": title,
        "description": "En rolig plass med god utsikt over fjorden.",
        "images": ["/uploads/1.jpg"]
    }))
}

fn memory_repo() -> (Arc<MemoryStore>, ListingRepository) {
    let store = Arc::new(MemoryStore::new());
    let repo = ListingRepository::new(store.clone());
    (store, repo)
}

#[tokio::test]
async fn create_prepends_newest_listing() {
    let (_, repo) = memory_repo();
    let first = repo.create(valid("Første plass")).await.unwrap();
    let second = repo.create(valid("Andre plass")).await.unwrap();

    let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn create_rejects_invalid_draft_without_writing() {
    let (store, repo) = memory_repo();
    let err = repo
        .create(draft(json!({"title": "Hi", "description": "short", "images": []})))
        .await
        .unwrap_err();
    match err {
        StoreError::Validation(problems) => assert_eq!(problems.len(), 3),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (_, repo) = memory_repo();
    let err = repo.update("nope", draft(json!({"title": "x"}))).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref id) if id == "nope"));
}

#[tokio::test]
async fn update_pins_identity_and_persists() {
    let (_, repo) = memory_repo();
    let created = repo.create(valid("Plass ved kaia")).await.unwrap();

    let updated = repo
        .update(
            &created.id,
            draft(json!({"id": "other", "createdAt": "1999-01-01", "title": "Ny tittel"})),
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at.is_some());

    let found = repo.find(&created.id).await.unwrap();
    assert_eq!(found.title, "Ny tittel");
}

#[tokio::test]
async fn delete_removes_and_reports_missing() {
    let (_, repo) = memory_repo();
    let created = repo.create(valid("Plass i skogen")).await.unwrap();
    repo.delete(&created.id).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
    assert!(matches!(
        repo.delete(&created.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn records_without_id_are_hidden_but_preserved() {
    let store = Arc::new(MemoryStore::with_records(vec![draft(json!({"title": "Uten id"}))]));
    let repo = ListingRepository::new(store.clone());
    assert!(repo.list().await.unwrap().is_empty());

    repo.create(valid("Ny plass her")).await.unwrap();
    let raw = store.read_all().await.unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1].title, Some(json!("Uten id")));
}

#[tokio::test]
async fn file_store_round_trip_through_repository() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.json");
    let repo = ListingRepository::new(Arc::new(JsonFileStore::new(&path)));

    let created = repo.create(valid("Båtplass ved brygga")).await.unwrap();
    let reread = ListingRepository::new(Arc::new(JsonFileStore::new(&path)))
        .find(&created.id)
        .await
        .unwrap();
    assert_eq!(reread, created);

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk[0]["category"], json!("batplass"));
    assert_eq!(on_disk[0]["mainImageUrl"], json!("/uploads/1.jpg"));
}
