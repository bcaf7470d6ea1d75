//! Contract tests for the event access service, run against the
//! in-memory backend. The Redis backend shares these semantics by
//! implementing the same traits; see redis_store_test.rs for the
//! backend-level checks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use callboard_common::{CallboardError, EventPatch, Identity, QueueEntry, RESERVED_SLUGS};
use callboard_store::{EventAccess, EventStore, MemoryStore};

fn strict() -> (Arc<MemoryStore>, EventAccess<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let access = EventAccess::new(store.clone(), false);
    (store, access)
}

fn alice() -> Identity {
    Identity::Verified("alice".to_string())
}

fn bob() -> Identity {
    Identity::Verified("bob".to_string())
}

#[tokio::test]
async fn view_of_unknown_slug_is_not_found_and_creates_nothing() {
    let (store, access) = strict();
    assert!(matches!(
        access.view("ghost", &Identity::Anonymous).await,
        Err(CallboardError::NotFound)
    ));
    assert!(store.get("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn create_sets_one_hour_lead_and_empty_queue() {
    let (_, access) = strict();
    let before = Utc::now();
    let event = access.create("demo", &alice()).await.unwrap();
    assert_eq!(event.owner.as_deref(), Some("alice"));
    assert_eq!(event.current_index, 0);
    assert!(event.items.is_empty());
    let lead = event.start_time - before;
    assert!(lead >= Duration::minutes(59) && lead <= Duration::minutes(61));
}

#[tokio::test]
async fn create_rejects_bad_and_reserved_slugs() {
    let (_, access) = strict();
    assert!(matches!(
        access.create("Not A Slug", &alice()).await,
        Err(CallboardError::InvalidSlug(_))
    ));
    for slug in RESERVED_SLUGS {
        assert!(
            matches!(
                access.create(slug, &alice()).await,
                Err(CallboardError::ReservedSlug)
            ),
            "{slug} should be reserved"
        );
    }
    assert!(matches!(
        access.create("demo", &Identity::Anonymous).await,
        Err(CallboardError::Unauthorized)
    ));
}

#[tokio::test]
async fn creation_never_adopts_an_existing_event() {
    let (store, access) = strict();
    access.create("demo", &alice()).await.unwrap();
    assert!(matches!(
        access.create("demo", &bob()).await,
        Err(CallboardError::AlreadyExists)
    ));
    // still alice's
    let event = store.get("demo").await.unwrap().unwrap();
    assert_eq!(event.owner.as_deref(), Some("alice"));
}

#[tokio::test]
async fn pre_start_view_hides_queue_from_everyone_but_the_owner() {
    let (_, access) = strict();
    access.create("demo", &alice()).await.unwrap();
    access
        .update(
            "demo",
            &alice(),
            EventPatch {
                items: Some(vec![QueueEntry {
                    id: "1".to_string(),
                    name: "first up".to_string(),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for caller in [Identity::Anonymous, bob()] {
        let view = access.view("demo", &caller).await.unwrap();
        assert!(!view.is_started);
        assert!(view.queue.is_empty());
        assert!(view.current.is_none());
        assert!(view.slug.is_none());
    }

    let owner_view = access.view("demo", &alice()).await.unwrap();
    assert_eq!(owner_view.queue.len(), 1);
    assert_eq!(owner_view.current.unwrap().name, "first up");
}

#[tokio::test]
async fn live_view_is_public() {
    let (_, access) = strict();
    access.create("demo", &alice()).await.unwrap();
    let past = Utc::now() - Duration::minutes(1);
    access
        .update(
            "demo",
            &alice(),
            EventPatch {
                start_time: Some(past),
                items: Some(vec![QueueEntry {
                    id: "1".to_string(),
                    name: "on stage".to_string(),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let view = access.view("demo", &Identity::Anonymous).await.unwrap();
    assert!(view.is_started);
    assert_eq!(view.slug.as_deref(), Some("demo"));
    assert_eq!(view.queue.len(), 1);
    assert_eq!(view.current.unwrap().name, "on stage");
}

#[tokio::test]
async fn rejected_updates_are_observable_noops() {
    let (store, access) = strict();
    access.create("demo", &alice()).await.unwrap();
    let before = store.get("demo").await.unwrap().unwrap();

    let patch = EventPatch {
        current_index: Some(7),
        ..Default::default()
    };
    assert!(matches!(
        access.update("demo", &Identity::Anonymous, patch.clone()).await,
        Err(CallboardError::Unauthorized)
    ));
    assert!(matches!(
        access.update("demo", &bob(), patch.clone()).await,
        Err(CallboardError::Forbidden)
    ));
    assert!(matches!(
        access.update("missing", &alice(), patch).await,
        Err(CallboardError::NotFound)
    ));

    assert_eq!(store.get("demo").await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn patch_is_sparse_and_start_time_round_trips_exactly() {
    let (store, access) = strict();
    access.create("demo", &alice()).await.unwrap();
    let created = store.get("demo").await.unwrap().unwrap();

    let t = DateTime::from_timestamp_millis(1_772_000_000_456).unwrap();
    let updated = access
        .update(
            "demo",
            &alice(),
            EventPatch {
                start_time: Some(t),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.start_time, t);
    // absent fields untouched
    assert_eq!(updated.current_index, created.current_index);
    assert_eq!(updated.items, created.items);

    let view = access.view("demo", &alice()).await.unwrap();
    assert_eq!(view.start_time, t);
}

#[tokio::test]
async fn list_owned_tracks_creation_and_deletion() {
    let (_, access) = strict();
    assert!(matches!(
        access.list_owned(&Identity::Anonymous).await,
        Err(CallboardError::Unauthorized)
    ));

    access.create("demo", &alice()).await.unwrap();
    access.create("late-show", &alice()).await.unwrap();
    access.create("other", &bob()).await.unwrap();

    let mut slugs: Vec<String> = access
        .list_owned(&alice())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.slug)
        .collect();
    slugs.sort();
    assert_eq!(slugs, ["demo", "late-show"]);

    assert!(access.delete("demo").await.unwrap());
    assert!(!access.delete("demo").await.unwrap());
    let slugs: Vec<String> = access
        .list_owned(&alice())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.slug)
        .collect();
    assert_eq!(slugs, ["late-show"]);
}

#[tokio::test]
async fn auto_create_mode_fabricates_ownerless_events() {
    let store = Arc::new(MemoryStore::new());
    let access = EventAccess::new(store.clone(), true);

    let view = access.view("walk-in", &Identity::Anonymous).await.unwrap();
    assert!(!view.is_started);
    assert!(view.queue.is_empty());

    let event = store.get("walk-in").await.unwrap().unwrap();
    assert!(event.owner.is_none());

    // nobody owns it, so nobody may mutate it
    assert!(matches!(
        access
            .update("walk-in", &alice(), EventPatch::default())
            .await,
        Err(CallboardError::Forbidden)
    ));

    // a second view serves the same event, not a fresh one
    let again = store.get("walk-in").await.unwrap().unwrap();
    access.view("walk-in", &Identity::Anonymous).await.unwrap();
    assert_eq!(store.get("walk-in").await.unwrap().unwrap(), again);
}
