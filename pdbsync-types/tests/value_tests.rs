use pdbsync_types::{Timestamp, Value};
use serde_json::json;

#[test]
fn conversions() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3i64), Value::Integer(3));
    assert_eq!(Value::from(1.5f64), Value::Float(1.5));
    assert_eq!(Value::from("a"), Value::Text("a".into()));
    assert_eq!(Value::from(Timestamp::EPOCH), Value::Timestamp(Timestamp::EPOCH));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(4i64)), Value::Integer(4));
}

#[test]
fn null_detection() {
    assert!(Value::Null.is_null());
    assert!(!Value::Integer(0).is_null());
}

#[test]
fn structured_values_serialize_compactly() {
    let social = json!([{"service": "website"}, "x", 1]);
    assert_eq!(
        Value::serialize_structured(&social),
        r#"[{"service":"website"},"x",1]"#
    );
}
