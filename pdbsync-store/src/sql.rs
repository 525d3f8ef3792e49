//! Statement text and value binding.

use crate::{StoreError, StoreResult};
use pdbsync_schema::Table;
use pdbsync_types::Value;
use rusqlite::types::Value as SqlValue;

/// Rejects names that cannot be placed verbatim in a statement.
pub(crate) fn checked_name(table: &str) -> StoreResult<&str> {
    if table.is_empty() || table.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidTable(table.to_string()));
    }
    Ok(table)
}

/// Converts a column value into what SQLite stores.
pub(crate) fn to_sql(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(b)),
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Float(f) => SqlValue::Real(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Timestamp(ts) => SqlValue::Text(ts.to_rfc3339()),
        Value::Structured(v) => SqlValue::Text(Value::serialize_structured(&v)),
    }
}

/// `id` followed by the table's data columns.
pub(crate) fn bound_values(id: i64, values: Vec<Value>) -> Vec<SqlValue> {
    std::iter::once(SqlValue::Integer(id))
        .chain(values.into_iter().map(to_sql))
        .collect()
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO t (id, c1, ..) VALUES (?1, ?2, ..)`
pub(crate) fn insert(table: &Table) -> String {
    let columns = table.column_names();
    format!(
        "INSERT INTO {} (id, {}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders(columns.len() + 1)
    )
}

/// Insert that updates every data column when the id already exists.
pub(crate) fn upsert(table: &Table) -> String {
    let assignments = table
        .column_names()
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ON CONFLICT (id) DO UPDATE SET {assignments}", insert(table))
}

/// `UPDATE t SET c1 = ?2, .. WHERE id = ?1`, bound like [`insert`].
pub(crate) fn update(table: &Table) -> String {
    let assignments = table
        .column_names()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{c} = ?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {assignments} WHERE id = ?1", table.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdbsync_schema::Column;
    use pdbsync_types::Timestamp;
    use serde_json::json;

    fn widget() -> Table {
        Table::new(
            "widget",
            vec![
                Column::id(),
                Column::datetime("updated"),
                Column::varchar("status", 255),
                Column::varchar("name", 64),
            ],
        )
    }

    #[test]
    fn statement_shapes() {
        let table = widget();
        assert_eq!(
            insert(&table),
            "INSERT INTO widget (id, updated, status, name) VALUES (?1, ?2, ?3, ?4)"
        );
        assert_eq!(
            update(&table),
            "UPDATE widget SET updated = ?2, status = ?3, name = ?4 WHERE id = ?1"
        );
        assert_eq!(
            upsert(&table),
            "INSERT INTO widget (id, updated, status, name) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (id) DO UPDATE SET updated = excluded.updated, \
             status = excluded.status, name = excluded.name"
        );
    }

    #[test]
    fn table_names_are_checked() {
        assert!(checked_name("peeringdb_network").is_ok());
        assert!(matches!(checked_name(""), Err(StoreError::InvalidTable(_))));
        assert!(matches!(
            checked_name("widget; DROP TABLE x"),
            Err(StoreError::InvalidTable(_))
        ));
        assert!(matches!(checked_name("a\tb"), Err(StoreError::InvalidTable(_))));
    }

    #[test]
    fn values_convert_to_sqlite_types() {
        assert_eq!(to_sql(Value::Bool(true)), SqlValue::Integer(1));
        assert_eq!(
            to_sql(Value::Timestamp(Timestamp::from_unix(0))),
            SqlValue::Text("1970-01-01T00:00:00Z".into())
        );
        assert_eq!(
            to_sql(Value::Structured(json!(["x", 1]))),
            SqlValue::Text("[\"x\",1]".into())
        );
        assert_eq!(to_sql(Value::Null), SqlValue::Null);
    }

    #[test]
    fn id_is_bound_first() {
        let bound = bound_values(7, vec![Value::Text("a".into())]);
        assert_eq!(bound, vec![SqlValue::Integer(7), SqlValue::Text("a".into())]);
    }
}
