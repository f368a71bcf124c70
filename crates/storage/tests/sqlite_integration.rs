use guided_core::model::AuthToken;
use guided_core::time::fixed_now;
use storage::repository::{SessionRecord, SessionStore, Storage};
use storage::sqlite::SqliteRepository;

async fn fresh_repo() -> SqliteRepository {
    let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
    repo.migrate().await.unwrap();
    repo
}

#[tokio::test]
async fn session_round_trips_through_sqlite() {
    let repo = fresh_repo().await;
    assert_eq!(repo.load_session().await.unwrap(), None);

    let record = SessionRecord::new(AuthToken::new("jwt-material").unwrap(), fixed_now());
    repo.save_session(&record).await.unwrap();

    let loaded = repo.load_session().await.unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn save_overwrites_the_single_session_slot() {
    let repo = fresh_repo().await;
    let now = fixed_now();

    repo.save_session(&SessionRecord::new(AuthToken::new("first").unwrap(), now))
        .await
        .unwrap();
    repo.save_session(&SessionRecord::new(AuthToken::new("second").unwrap(), now))
        .await
        .unwrap();

    let loaded = repo.load_session().await.unwrap().unwrap();
    assert_eq!(loaded.token.as_str(), "second");
}

#[tokio::test]
async fn clear_removes_the_session() {
    let repo = fresh_repo().await;
    let record = SessionRecord::new(AuthToken::new("jwt-material").unwrap(), fixed_now());
    repo.save_session(&record).await.unwrap();

    repo.clear_session().await.unwrap();
    assert_eq!(repo.load_session().await.unwrap(), None);

    // Clearing again is a no-op.
    repo.clear_session().await.unwrap();
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
    repo.migrate().await.unwrap();
    repo.migrate().await.unwrap();

    let storage = Storage {
        sessions: std::sync::Arc::new(repo),
    };
    assert_eq!(storage.sessions.load_session().await.unwrap(), None);
}
