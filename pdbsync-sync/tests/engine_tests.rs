mod common;

use common::{engine, record, test_store};
use pdbsync_store::{BatchSummary, SqlValue, StoreError, WriteMode};
use pdbsync_sync::{
    CountingProgress, MemorySource, ProgressReporter, SyncConfig, SyncError,
};
use pdbsync_schema::EntityType;
use pdbsync_types::{DELETED_STATUS, Timestamp};
use std::sync::{Arc, Mutex};

// ── First synchronization ────────────────────────────────────────

#[tokio::test]
async fn widget_scenario() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records(
        "widgets",
        [
            record(1, 100, "ok", "A"),
            record(2, 200, DELETED_STATUS, "B"),
        ],
    ));

    let report = engine(&store, &source).sync_named("widgets").await.unwrap();

    assert_eq!(report.since, Timestamp::EPOCH);
    assert_eq!(report.fetched, 2);
    assert_eq!(store.ids("widget").unwrap(), vec![1]);
    let row = store.row("widget", 1).unwrap().unwrap();
    assert_eq!(row["name"], SqlValue::Text("A".into()));
}

#[tokio::test]
async fn first_sync_requests_everything() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records("organizations", [record(1, 10, "ok", "Org")]));

    engine(&store, &source).sync_named("organizations").await.unwrap();

    assert_eq!(
        source.requests().await,
        vec![("organizations".to_string(), Timestamp::EPOCH)]
    );
}

// ── Incremental synchronization ──────────────────────────────────

#[tokio::test]
async fn second_run_without_changes_is_a_noop() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records(
        "widgets",
        [record(1, 100, "ok", "A"), record(2, 200, "ok", "B")],
    ));
    let engine = engine(&store, &source);

    engine.sync_named("widgets").await.unwrap();
    let before = (store.row("widget", 1).unwrap(), store.row("widget", 2).unwrap());

    let report = engine.sync_named("widgets").await.unwrap();

    assert_eq!(report.since, Timestamp::from_unix(200));
    assert_eq!(report.fetched, 0);
    assert_eq!(report.summary, BatchSummary::default());
    let after = (store.row("widget", 1).unwrap(), store.row("widget", 2).unwrap());
    assert_eq!(before, after);
}

#[tokio::test]
async fn changes_since_watermark_are_applied() {
    for write_mode in [WriteMode::OnConflict, WriteMode::Probe] {
        let store = test_store();
        let source = Arc::new(MemorySource::new().with_records(
            "widgets",
            [record(1, 100, "ok", "A"), record(2, 100, "ok", "B")],
        ));
        let engine = engine(&store, &source).with_config(SyncConfig { write_mode });
        engine.sync_named("widgets").await.unwrap();

        source
            .push(
                "widgets",
                [
                    record(1, 300, "ok", "A2"),
                    record(2, 300, DELETED_STATUS, "B"),
                    record(3, 300, "ok", "C"),
                ],
            )
            .await;
        let report = engine.sync_named("widgets").await.unwrap();

        assert_eq!(report.since, Timestamp::from_unix(100), "{write_mode}");
        assert_eq!(report.fetched, 3);
        assert_eq!(report.summary.inserted, 1);
        assert_eq!(report.summary.updated, 2);
        assert_eq!(report.summary.deleted, 1);
        assert_eq!(store.ids("widget").unwrap(), vec![1, 3]);
        let row = store.row("widget", 1).unwrap().unwrap();
        assert_eq!(row["name"], SqlValue::Text("A2".into()));
    }
}

#[tokio::test]
async fn emptied_table_triggers_full_resync() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records("widgets", [record(1, 100, "ok", "A")]));
    let engine = engine(&store, &source);
    engine.sync_named("widgets").await.unwrap();

    store.clear(engine.catalog().schema()).unwrap();
    let report = engine.sync_named("widgets").await.unwrap();

    assert_eq!(report.since, Timestamp::EPOCH);
    assert_eq!(store.ids("widget").unwrap(), vec![1]);
}

// ── Progress ─────────────────────────────────────────────────────

#[tokio::test]
async fn progress_receives_total_increments_and_completion() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records(
        "widgets",
        [record(1, 1, "ok", "A"), record(2, 2, "ok", "B"), record(3, 3, "ok", "C")],
    ));
    let counting = Arc::new(CountingProgress::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let factory = {
        let counting = Arc::clone(&counting);
        let seen = Arc::clone(&seen);
        move |entity: &EntityType| -> Arc<dyn ProgressReporter> {
            seen.lock().unwrap().push(entity.name.clone());
            Arc::clone(&counting) as Arc<dyn ProgressReporter>
        }
    };
    engine(&store, &source)
        .with_progress(Arc::new(factory))
        .sync_named("widgets")
        .await
        .unwrap();

    assert_eq!(counting.total(), 3);
    assert_eq!(counting.increments(), 3);
    assert!(counting.is_complete());
    assert_eq!(*seen.lock().unwrap(), vec!["widgets"]);
}

#[tokio::test]
async fn no_progress_when_nothing_changed() {
    let store = test_store();
    let source = Arc::new(MemorySource::new());
    let counting = Arc::new(CountingProgress::new());
    let factory = {
        let counting = Arc::clone(&counting);
        move |_: &EntityType| -> Arc<dyn ProgressReporter> {
            Arc::clone(&counting) as Arc<dyn ProgressReporter>
        }
    };

    engine(&store, &source)
        .with_progress(Arc::new(factory))
        .sync_named("widgets")
        .await
        .unwrap();

    assert!(!counting.is_complete());
    assert_eq!(counting.increments(), 0);
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn source_failure_leaves_table_untouched() {
    let store = test_store();
    let source = Arc::new(
        MemorySource::new()
            .with_records("widgets", [record(1, 1, "ok", "A")])
            .with_failure("widgets", "connection reset"),
    );

    let err = engine(&store, &source).sync_named("widgets").await.unwrap_err();

    assert!(matches!(err, SyncError::Network(msg) if msg == "connection reset"));
    assert_eq!(store.count("widget").unwrap(), 0);
}

#[tokio::test]
async fn store_failure_rolls_back_batch() {
    let store = test_store();
    let source = Arc::new(MemorySource::new().with_records(
        "widgets",
        [
            record(1, 1, "ok", "A").with_field("serial", "SN-1"),
            record(2, 2, "ok", "B").with_field("serial", "SN-1"),
        ],
    ));

    let err = engine(&store, &source).sync_named("widgets").await.unwrap_err();

    assert!(matches!(err, SyncError::Store(StoreError::Database(_))));
    assert_eq!(store.count("widget").unwrap(), 0);
}

#[tokio::test]
async fn record_missing_attributes_is_still_written() {
    let store = test_store();
    let bare = pdbsync_types::Record::new(2, Timestamp::from_unix(2), "ok");
    let source = Arc::new(
        MemorySource::new().with_records("widgets", [record(1, 1, "ok", "A"), bare]),
    );

    let report = engine(&store, &source).sync_named("widgets").await.unwrap();

    assert_eq!(report.summary.inserted, 2);
    let row = store.row("widget", 2).unwrap().unwrap();
    assert_eq!(row["name"], SqlValue::Text(String::new()));
    assert_eq!(row["serial"], SqlValue::Null);
}

#[tokio::test]
async fn unknown_entity_is_rejected() {
    let store = test_store();
    let source = Arc::new(MemorySource::new());
    let err = engine(&store, &source).sync_named("gadgets").await.unwrap_err();
    assert!(matches!(err, SyncError::UnknownEntity(name) if name == "gadgets"));
}

#[tokio::test]
async fn uninitialized_store_is_reported() {
    let store = pdbsync_store::Store::open_in_memory().unwrap();
    let source = Arc::new(MemorySource::new());
    let err = engine(&store, &source).sync_named("widgets").await.unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::UnknownTable(table)) if table == "widget"));
}
