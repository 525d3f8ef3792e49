use pdbsync_types::Timestamp;
use proptest::prelude::*;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn epoch_is_default() {
    assert_eq!(Timestamp::default(), Timestamp::EPOCH);
    assert!(Timestamp::EPOCH.is_epoch());
    assert!(!Timestamp::from_unix(1).is_epoch());
}

#[test]
fn now_is_after_epoch() {
    assert!(Timestamp::now() > Timestamp::EPOCH);
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_rfc3339_utc() {
    let ts = Timestamp::parse("2016-03-14T21:48:04Z").unwrap();
    assert_eq!(ts.as_unix(), 1_457_992_084);
}

#[test]
fn parse_rfc3339_with_offset() {
    let ts = Timestamp::parse("2016-03-14T23:48:04+02:00").unwrap();
    assert_eq!(ts.as_unix(), 1_457_992_084);
}

#[test]
fn parse_sqlite_text_forms() {
    let expected = 1_457_992_084;
    assert_eq!(Timestamp::parse("2016-03-14 21:48:04").unwrap().as_unix(), expected);
    assert_eq!(Timestamp::parse("2016-03-14 21:48:04+00:00").unwrap().as_unix(), expected);
    assert_eq!(Timestamp::parse("2016-03-14 21:48:04.250").unwrap().as_unix(), expected);
}

#[test]
fn parse_trims_whitespace() {
    assert!(Timestamp::parse("  2016-03-14T21:48:04Z ").is_ok());
}

#[test]
fn parse_rejects_garbage() {
    assert!(Timestamp::parse("yesterday").is_err());
    assert!(Timestamp::parse("").is_err());
}

#[test]
fn from_str_delegates_to_parse() {
    let ts: Timestamp = "1970-01-01T00:01:40Z".parse().unwrap();
    assert_eq!(ts, Timestamp::from_unix(100));
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn renders_storage_format() {
    assert_eq!(Timestamp::EPOCH.to_rfc3339(), "1970-01-01T00:00:00Z");
    assert_eq!(Timestamp::from_unix(200).to_string(), "1970-01-01T00:03:20Z");
}

#[test]
fn serde_is_transparent() {
    let json = serde_json::to_string(&Timestamp::from_unix(42)).unwrap();
    assert_eq!(json, "42");
}

proptest! {
    /// Text order of the storage form agrees with numeric order, which the
    /// watermark query relies on.
    #[test]
    fn text_order_matches_time_order(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
        let (ta, tb) = (Timestamp::from_unix(a), Timestamp::from_unix(b));
        prop_assert_eq!(ta.cmp(&tb), ta.to_rfc3339().cmp(&tb.to_rfc3339()));
        prop_assert_eq!(Timestamp::parse(&ta.to_rfc3339()).unwrap(), ta);
    }
}
