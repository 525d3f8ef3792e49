//! Records fetched from the remote catalog.

use crate::{Error, Result, Timestamp};
use serde_json::{Map, Value as JsonValue};

/// Status value the source uses to tombstone a record.
pub const DELETED_STATUS: &str = "deleted";

/// One object of a synchronizable entity type.
///
/// The three mandatory attributes are validated and kept typed; every
/// attribute (mandatory ones included) is also kept verbatim in `fields` so a
/// table can map any of its columns from the same place.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: i64,
    updated: Timestamp,
    status: String,
    fields: Map<String, JsonValue>,
}

impl Record {
    /// Creates a record carrying only its mandatory attributes.
    pub fn new(id: i64, updated: Timestamp, status: impl Into<String>) -> Self {
        let status = status.into();
        let mut fields = Map::new();
        fields.insert("id".into(), JsonValue::from(id));
        fields.insert("updated".into(), JsonValue::from(updated.to_rfc3339()));
        fields.insert("status".into(), JsonValue::from(status.clone()));
        Self {
            id,
            updated,
            status,
            fields,
        }
    }

    /// Builds a record from one JSON object of the source's response.
    ///
    /// `id` must be a positive integer, `updated` an RFC 3339 string or a Unix
    /// second count, and `status` a string.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let JsonValue::Object(fields) = value else {
            return Err(Error::InvalidField {
                field: "record",
                reason: "expected a JSON object".into(),
            });
        };

        let id = match fields.get("id") {
            None | Some(JsonValue::Null) => return Err(Error::MissingField("id")),
            Some(v) => v.as_i64().filter(|id| *id > 0).ok_or_else(|| Error::InvalidField {
                field: "id",
                reason: format!("expected a positive integer, got {v}"),
            })?,
        };

        let updated = match fields.get("updated") {
            None | Some(JsonValue::Null) => return Err(Error::MissingField("updated")),
            Some(JsonValue::String(s)) => Timestamp::parse(s)?,
            Some(v) => v.as_i64().map(Timestamp::from_unix).ok_or_else(|| {
                Error::InvalidField {
                    field: "updated",
                    reason: format!("expected a timestamp, got {v}"),
                }
            })?,
        };

        let status = match fields.get("status") {
            None | Some(JsonValue::Null) => return Err(Error::MissingField("status")),
            Some(JsonValue::String(s)) => s.clone(),
            Some(v) => {
                return Err(Error::InvalidField {
                    field: "status",
                    reason: format!("expected a string, got {v}"),
                });
            }
        };

        Ok(Self {
            id,
            updated,
            status,
            fields,
        })
    }

    /// Adds or replaces an attribute. Mandatory attributes cannot be changed
    /// this way.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let name = name.into();
        if !matches!(name.as_str(), "id" | "updated" | "status") {
            self.fields.insert(name, value.into());
        }
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn updated(&self) -> Timestamp {
        self.updated
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns true when the source tombstoned this record.
    pub fn is_deleted(&self) -> bool {
        self.status == DELETED_STATUS
    }

    /// Returns an attribute by name.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// All attributes, mandatory ones included.
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }
}

impl TryFrom<JsonValue> for Record {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self> {
        Self::from_json(value)
    }
}
