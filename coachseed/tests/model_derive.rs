//! `#[derive(Model)]` output as seen by downstream crates.

use chrono::{DateTime, TimeZone, Utc};
use coachseed::{IndexField, IndexKind, MemoryStore, Model, Repo, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(register = false)]
struct CoachingSession {
    #[coach(id)]
    session_id: String,
    #[coach(unique, index(tag))]
    slug: String,
    #[coach(index(text, sortable))]
    topic: String,
    #[coach(index(numeric))]
    minutes: u32,
    notes: String,
    #[coach(created_at)]
    opened_at: DateTime<Utc>,
    #[coach(updated_at)]
    touched_at: DateTime<Utc>,
}

impl CoachingSession {
    fn new(slug: &str, topic: &str) -> Self {
        Self {
            session_id: String::new(),
            slug: slug.to_string(),
            topic: topic.to_string(),
            minutes: 45,
            notes: String::new(),
            opened_at: DateTime::<Utc>::default(),
            touched_at: DateTime::<Utc>::default(),
        }
    }
}

#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "bare_notes", register = false)]
struct Note {
    #[coach(id)]
    id: String,
    body: String,
}

#[test]
fn descriptor_reflects_attributes() {
    let descriptor = CoachingSession::descriptor();
    assert_eq!(descriptor.type_name, "CoachingSession");
    assert_eq!(descriptor.collection, "coaching_sessions");
    assert_eq!(CoachingSession::COLLECTION, "coaching_sessions");
    assert_eq!(descriptor.id_field, "session_id");
    assert_eq!(descriptor.natural_keys, &["slug"]);
    assert_eq!(
        descriptor.indexes,
        &[
            IndexField {
                field: "slug",
                kind: IndexKind::Tag,
                sortable: false,
            },
            IndexField {
                field: "topic",
                kind: IndexKind::Text,
                sortable: true,
            },
            IndexField {
                field: "minutes",
                kind: IndexKind::Numeric,
                sortable: false,
            },
        ]
    );
    assert!(descriptor.is_natural_key("slug"));
    assert!(!descriptor.is_natural_key("topic"));
}

#[test]
fn explicit_collection_without_indexes() {
    let descriptor = Note::descriptor();
    assert_eq!(descriptor.collection, "bare_notes");
    assert!(!descriptor.is_indexed());
    assert!(descriptor.natural_keys.is_empty());
}

#[test]
fn stamp_sets_created_only_on_insert() {
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();

    let mut session = CoachingSession::new("kickoff", "Goals");
    session.stamp(first, true);
    assert_eq!((session.opened_at, session.touched_at), (first, first));

    session.stamp(later, false);
    assert_eq!((session.opened_at, session.touched_at), (first, later));

    session.set_id("s-1".to_string());
    assert_eq!(session.id(), "s-1");
}

#[tokio::test]
async fn repo_uses_custom_id_field() {
    let mut store = MemoryStore::new();
    let repo = Repo::<CoachingSession>::new();

    let created = repo
        .create(&mut store, CoachingSession::new("kickoff", "Goals"))
        .await
        .unwrap();
    assert_eq!(created.session_id.len(), 16);
    assert_ne!(created.opened_at, DateTime::<Utc>::default());

    let fetched = repo.get(&mut store, &created.session_id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let err = repo
        .create(&mut store, CoachingSession::new("kickoff", "Other"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DuplicateKey { ref field, ref existing_id, .. }
            if field == "slug" && existing_id == &created.session_id
    ));
}
