//! Runs against a live Redis with the RedisJSON and RediSearch modules.
//!
//! `REDIS_URL=redis://127.0.0.1:6379 cargo test --test redis -- --ignored`

use coachseed::{
    CollectionInitializer, DocumentStore, MigrationRecord, MigrationRegistry, MigrationRunner, Model, RedisStore, Repo,
    RollbackOutcome,
    id::new_document_id,
    models::{LogEntry, Profile, Role, User},
    seeds,
};
use serde_json::json;
use serial_test::serial;

async fn connect() -> RedisStore {
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let prefix = format!("coachseed_test_{}", new_document_id());
    RedisStore::connect(&redis_url, prefix)
        .await
        .expect("Failed to connect to Redis")
}

async fn cleanup(store: &mut RedisStore) {
    let pattern = format!("{}:*", store.keys().prefix());
    let keys: Vec<String> = redis::cmd("KEYS")
        .arg(&pattern)
        .query_async(store.conn())
        .await
        .unwrap_or_default();
    if !keys.is_empty() {
        let _: () = redis::cmd("DEL").arg(&keys).query_async(store.conn()).await.unwrap();
    }

    for collection in ["logs", "migrations", "profiles", "roles", "users"] {
        let index = store.keys().index(collection);
        let _: redis::RedisResult<()> = redis::cmd("FT.DROPINDEX").arg(&index).query_async(store.conn()).await;
    }
}

#[tokio::test]
#[ignore = "requires Redis with RedisJSON and RediSearch"]
#[serial]
async fn document_round_trip() {
    let mut store = connect().await;

    store.put("notes", "n1", &json!({ "id": "n1", "body": "hello" })).await.unwrap();
    assert_eq!(store.get("notes", "n1").await.unwrap().unwrap()["body"], "hello");
    assert_eq!(store.scan("notes").await.unwrap().len(), 1);

    assert!(store.delete("notes", "n1").await.unwrap());
    assert!(!store.delete("notes", "n1").await.unwrap());
    assert!(store.get("notes", "n1").await.unwrap().is_none());

    cleanup(&mut store).await;
}

#[tokio::test]
#[ignore = "requires Redis with RedisJSON and RediSearch"]
#[serial]
async fn seeds_apply_and_roll_back() {
    let mut store = connect().await;
    let registry = MigrationRegistry::from_migrations(seeds::all()).unwrap();
    let initializer = || {
        CollectionInitializer::new(vec![
            LogEntry::descriptor(),
            MigrationRecord::descriptor(),
            Profile::descriptor(),
            Role::descriptor(),
            User::descriptor(),
        ])
    };

    let report = MigrationRunner::new(&mut store, &registry)
        .with_initializer(initializer())
        .run()
        .await;
    assert!(!report.has_problems(), "{report:?}");
    assert_eq!(report.applied(), 5);
    let collections = report.collections.unwrap();
    assert_eq!(collections.created.len(), 5);
    assert_eq!(collections.indexed.len(), 5);

    assert_eq!(Repo::<Role>::new().count(&mut store).await.unwrap(), 4);
    assert_eq!(Repo::<User>::new().count(&mut store).await.unwrap(), 4);
    assert_eq!(Repo::<Profile>::new().count(&mut store).await.unwrap(), 3);

    let report = MigrationRunner::new(&mut store, &registry)
        .with_initializer(initializer())
        .run()
        .await;
    assert_eq!(report.skipped(), 5);
    assert!(report.collections.unwrap().indexed.is_empty());

    let outcome = MigrationRunner::new(&mut store, &registry).rollback_last().await.unwrap();
    assert!(matches!(outcome, RollbackOutcome::RolledBack { ref name, .. } if name == "5-audit-bootstrap"));
    assert_eq!(Repo::<LogEntry>::new().count(&mut store).await.unwrap(), 0);

    cleanup(&mut store).await;
}
