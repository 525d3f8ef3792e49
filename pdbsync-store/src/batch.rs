//! Applying one fetched batch of records to a table.

use crate::sql::{self, checked_name};
use crate::store::{count_in, exists_in};
use crate::{Store, StoreResult};
use pdbsync_schema::Table;
use pdbsync_types::{DELETED_STATUS, Record, Timestamp};
use rusqlite::{Transaction, params, params_from_iter};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How a record that may already be stored is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// One `INSERT .. ON CONFLICT (id) DO UPDATE` per record.
    #[default]
    OnConflict,
    /// Look the id up, then `INSERT` or `UPDATE`.
    Probe,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnConflict => f.write_str("on-conflict"),
            Self::Probe => f.write_str("probe"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on-conflict" => Ok(Self::OnConflict),
            "probe" => Ok(Self::Probe),
            other => Err(format!(
                "unknown write mode `{other}`, expected `on-conflict` or `probe`"
            )),
        }
    }
}

/// Receives one call per record written by [`Store::apply_batch`].
pub trait BatchObserver {
    fn record_applied(&self);
}

impl BatchObserver for () {
    fn record_applied(&self) {}
}

/// Outcome of one committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows that did not exist before the batch.
    pub inserted: usize,
    /// Writes that replaced an existing row.
    pub updated: usize,
    /// Tombstoned rows removed after the writes.
    pub deleted: usize,
}

impl BatchSummary {
    /// Records written, tombstones included.
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }
}

impl Store {
    /// Writes `records` into `table` and removes tombstoned rows, all in one
    /// transaction.
    ///
    /// `since` is the watermark the records were fetched with. When it is the
    /// epoch the table is taken to be empty and no row is looked up, whatever
    /// the `mode`; a repeated id then overwrites the earlier one.
    ///
    /// Nothing is committed unless every statement succeeds.
    pub fn apply_batch(
        &self,
        table: &Table,
        records: &[Record],
        since: Timestamp,
        mode: WriteMode,
        observer: &dyn BatchObserver,
    ) -> StoreResult<BatchSummary> {
        let name = checked_name(&table.name)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut summary = if since.is_epoch() || mode == WriteMode::OnConflict {
            upsert_all(&tx, table, records, observer)?
        } else {
            probe_all(&tx, table, records, observer)?
        };

        summary.deleted = tx.execute(
            &format!("DELETE FROM {name} WHERE status = ?1"),
            params![DELETED_STATUS],
        )?;
        tx.commit()?;

        debug!(
            table = name,
            %since,
            %mode,
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            "batch committed"
        );
        Ok(summary)
    }
}

fn upsert_all(
    tx: &Transaction<'_>,
    table: &Table,
    records: &[Record],
    observer: &dyn BatchObserver,
) -> StoreResult<BatchSummary> {
    let before = count_in(tx, &table.name)?;
    {
        let mut stmt = tx.prepare_cached(&sql::upsert(table))?;
        for record in records {
            let values = sql::bound_values(record.id(), table.row_values(record));
            stmt.execute(params_from_iter(values))?;
            observer.record_applied();
        }
    }
    let inserted = count_in(tx, &table.name)?.saturating_sub(before);
    Ok(BatchSummary {
        inserted,
        updated: records.len() - inserted.min(records.len()),
        deleted: 0,
    })
}

fn probe_all(
    tx: &Transaction<'_>,
    table: &Table,
    records: &[Record],
    observer: &dyn BatchObserver,
) -> StoreResult<BatchSummary> {
    let mut insert = tx.prepare_cached(&sql::insert(table))?;
    let mut update = tx.prepare_cached(&sql::update(table))?;
    let mut summary = BatchSummary::default();
    for record in records {
        let values = sql::bound_values(record.id(), table.row_values(record));
        if exists_in(tx, &table.name, record.id())? {
            update.execute(params_from_iter(values))?;
            summary.updated += 1;
        } else {
            insert.execute(params_from_iter(values))?;
            summary.inserted += 1;
        }
        observer.record_applied();
    }
    Ok(summary)
}
