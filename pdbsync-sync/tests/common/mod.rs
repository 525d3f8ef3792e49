//! Shared test helpers for sync tests.

#![allow(dead_code)]

use pdbsync_schema::{Catalog, Column, EntityType, Schema, Table};
use pdbsync_store::Store;
use pdbsync_sync::{MemorySource, RecordSource, SyncEngine};
use pdbsync_types::{Record, Timestamp};
use std::sync::Arc;

fn table(name: &str, extra: Vec<Column>) -> Table {
    let mut columns = vec![
        Column::id(),
        Column::datetime("updated"),
        Column::varchar("status", 255),
        Column::varchar("name", 64),
    ];
    columns.extend(extra);
    Table::new(name, columns)
}

/// Organizations, campuses, carriers and facilities, plus a standalone
/// widget table.
///
/// campuses and carriers both depend only on organizations; facilities
/// depends on organizations and campuses.
pub fn test_catalog() -> Catalog {
    let schema = Schema::new(
        vec![
            table("org", vec![]),
            table("campus", vec![Column::reference("org_id", "org")]),
            table("carrier", vec![Column::reference("org_id", "org")]),
            table(
                "fac",
                vec![
                    Column::reference("org_id", "org"),
                    Column::reference("campus_id", "campus").nullable(),
                ],
            ),
            table(
                "widget",
                vec![Column::varchar("serial", 32).nullable().unique()],
            ),
        ],
        vec![],
    );
    let entities = vec![
        EntityType::new("organizations", "Organizations", "org", "org"),
        EntityType::new("campuses", "Campuses", "campus", "campus").depends_on(&["organizations"]),
        EntityType::new("carriers", "Carriers", "carrier", "carrier")
            .depends_on(&["organizations"]),
        EntityType::new("facilities", "Facilities", "fac", "fac")
            .depends_on(&["organizations", "campuses"]),
        EntityType::new("widgets", "Widgets", "widget", "widget"),
    ];
    Catalog::new(schema, entities).unwrap()
}

pub fn record(id: i64, updated: i64, status: &str, name: &str) -> Record {
    Record::new(id, Timestamp::from_unix(updated), status).with_field("name", name)
}

/// An initialized in-memory store for [`test_catalog`].
pub fn test_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema(test_catalog().schema()).unwrap();
    store
}

pub fn engine(store: &Store, source: &Arc<MemorySource>) -> SyncEngine {
    SyncEngine::new(store.clone(), Arc::clone(source) as Arc<dyn RecordSource>, test_catalog())
}
