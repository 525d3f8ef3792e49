use pdbsync_schema::{Column, ColumnType};
use pdbsync_types::{Timestamp, Value};
use serde_json::json;

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn type_names() {
    assert_eq!(ColumnType::Integer.to_string(), "integer");
    assert_eq!(ColumnType::UnsignedInteger.to_string(), "integer unsigned");
    assert_eq!(ColumnType::Varchar(48).to_string(), "varchar(48)");
    assert_eq!(ColumnType::Datetime.to_string(), "datetime");
}

#[test]
fn primary_key_definition() {
    assert_eq!(
        Column::id().definition(),
        "id integer NOT NULL PRIMARY KEY AUTOINCREMENT"
    );
}

#[test]
fn constraint_combinations() {
    assert_eq!(Column::varchar("name", 255).unique().constraints(), "NOT NULL UNIQUE");
    assert_eq!(Column::float("latitude").nullable().constraints(), "NULL");
    assert_eq!(
        Column::reference("org_id", "peeringdb_organization").definition(),
        "org_id integer NOT NULL REFERENCES peeringdb_organization (id)"
    );
    assert_eq!(
        Column::reference("campus_id", "peeringdb_campus")
            .nullable()
            .constraints(),
        "NULL REFERENCES peeringdb_campus (id)"
    );
}

// ── Conversion ───────────────────────────────────────────────────

#[test]
fn absent_and_null_become_null() {
    assert_eq!(ColumnType::Text.convert(None), Value::Null);
    assert_eq!(ColumnType::Integer.convert(Some(&json!(null))), Value::Null);
}

#[test]
fn nullable_column_keeps_null() {
    let latitude = Column::float("latitude").nullable();
    assert_eq!(latitude.convert(None), Value::Null);
    assert_eq!(latitude.convert(Some(&json!(null))), Value::Null);
}

#[test]
fn not_null_column_falls_back_to_zero_value() {
    assert_eq!(Column::varchar("aka", 255).convert(None), Value::Text(String::new()));
    assert_eq!(Column::text("notes").convert(Some(&json!(null))), Value::Text(String::new()));
    assert_eq!(Column::integer("asn").convert(None), Value::Integer(0));
    assert_eq!(Column::unsigned("info_prefixes4").convert(None), Value::Integer(0));
    assert_eq!(Column::float("speed").convert(None), Value::Float(0.0));
    assert_eq!(Column::bool("operational").convert(None), Value::Bool(false));
    assert_eq!(
        Column::datetime("created").convert(Some(&json!(null))),
        Value::Timestamp(Timestamp::EPOCH)
    );
}

#[test]
fn not_null_column_keeps_present_values() {
    assert_eq!(Column::integer("asn").convert(Some(&json!(64512))), Value::Integer(64512));
    assert_eq!(
        Column::varchar("aka", 255).convert(Some(&json!("Example"))),
        Value::Text("Example".into())
    );
}

#[test]
fn lists_are_kept_structured() {
    let raw = json!([{"service": "website", "identifier": "https://example.net"}]);
    assert_eq!(
        ColumnType::Text.convert(Some(&raw)),
        Value::Structured(raw.clone())
    );
    assert_eq!(
        ColumnType::Varchar(255).convert(Some(&json!({"a": 1}))),
        Value::Structured(json!({"a": 1}))
    );
}

#[test]
fn datetime_strings_are_parsed() {
    assert_eq!(
        ColumnType::Datetime.convert(Some(&json!("2020-01-02T03:04:05Z"))),
        Value::Timestamp(Timestamp::parse("2020-01-02T03:04:05Z").unwrap())
    );
}

#[test]
fn unparsable_datetime_is_kept_as_text() {
    assert_eq!(
        ColumnType::Datetime.convert(Some(&json!("soon"))),
        Value::Text("soon".into())
    );
}

#[test]
fn numbers_follow_column_type() {
    assert_eq!(ColumnType::Integer.convert(Some(&json!(42))), Value::Integer(42));
    assert_eq!(ColumnType::Float.convert(Some(&json!(42))), Value::Float(42.0));
    assert_eq!(ColumnType::Float.convert(Some(&json!(1.5))), Value::Float(1.5));
    assert_eq!(
        ColumnType::Varchar(16).convert(Some(&json!(64512))),
        Value::Text("64512".into())
    );
    assert_eq!(ColumnType::Bool.convert(Some(&json!(0))), Value::Bool(false));
    assert_eq!(ColumnType::Bool.convert(Some(&json!(1))), Value::Bool(true));
}

#[test]
fn booleans_and_strings() {
    assert_eq!(ColumnType::Bool.convert(Some(&json!(true))), Value::Bool(true));
    assert_eq!(
        ColumnType::UnsignedInteger.convert(Some(&json!(true))),
        Value::Integer(1)
    );
    assert_eq!(
        ColumnType::Varchar(7).convert(Some(&json!("NL"))),
        Value::Text("NL".into())
    );
}
