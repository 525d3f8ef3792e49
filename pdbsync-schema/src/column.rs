use pdbsync_types::{Timestamp, Value};
use serde_json::Value as JsonValue;
use std::fmt;

/// SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    UnsignedInteger,
    Varchar(u16),
    Text,
    Datetime,
    Bool,
    Float,
}

impl ColumnType {
    /// Converts one attribute of a fetched record into the value stored in a
    /// column of this type.
    ///
    /// Lists and objects are kept whole as [`Value::Structured`] whatever the
    /// column type; they are serialized to text when bound.
    pub fn convert(&self, raw: Option<&JsonValue>) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };
        match (self, raw) {
            (_, JsonValue::Null) => Value::Null,
            (_, JsonValue::Array(_) | JsonValue::Object(_)) => Value::Structured(raw.clone()),

            (Self::Datetime, JsonValue::String(s)) => Timestamp::parse(s)
                .map(Value::Timestamp)
                .unwrap_or_else(|_| Value::Text(s.clone())),
            (Self::Datetime, JsonValue::Number(n)) => n
                .as_i64()
                .map(|secs| Value::Timestamp(Timestamp::from_unix(secs)))
                .unwrap_or_else(|| Value::Text(n.to_string())),

            (Self::Bool, JsonValue::Number(n)) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),

            (Self::Integer | Self::UnsignedInteger, JsonValue::Bool(b)) => {
                Value::Integer(i64::from(*b))
            }
            (_, JsonValue::Number(n)) if !matches!(self, Self::Varchar(_) | Self::Text) => {
                match n.as_i64() {
                    Some(i) if *self != Self::Float => Value::Integer(i),
                    _ => n.as_f64().map_or(Value::Null, Value::Float),
                }
            }

            (_, JsonValue::Bool(b)) => Value::Bool(*b),
            (_, JsonValue::Number(n)) => Value::Text(n.to_string()),
            (_, JsonValue::String(s)) => Value::Text(s.clone()),
        }
    }

    /// Value stored in a `NOT NULL` column of this type when the record has
    /// none.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Integer | Self::UnsignedInteger => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::Bool => Value::Bool(false),
            Self::Datetime => Value::Timestamp(Timestamp::EPOCH),
            Self::Varchar(_) | Self::Text => Value::Text(String::new()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::UnsignedInteger => f.write_str("integer unsigned"),
            Self::Varchar(len) => write!(f, "varchar({len})"),
            Self::Text => f.write_str("text"),
            Self::Datetime => f.write_str("datetime"),
            Self::Bool => f.write_str("bool"),
            Self::Float => f.write_str("float"),
        }
    }
}

/// A single column of a table.
///
/// Columns are `NOT NULL` unless marked [`Column::nullable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    /// Table whose `id` this column references.
    pub references: Option<String>,
}

impl Column {
    /// Creates a `NOT NULL` column.
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
            primary_key: false,
            references: None,
        }
    }

    /// The auto-increment integer primary key every table starts with.
    pub fn id() -> Self {
        Self {
            primary_key: true,
            ..Self::new("id", ColumnType::Integer)
        }
    }

    /// Shorthand for an integer column.
    pub fn integer(name: &str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    /// Shorthand for an unsigned integer column.
    pub fn unsigned(name: &str) -> Self {
        Self::new(name, ColumnType::UnsignedInteger)
    }

    /// Shorthand for a bounded string column.
    pub fn varchar(name: &str, len: u16) -> Self {
        Self::new(name, ColumnType::Varchar(len))
    }

    /// Shorthand for an unbounded text column.
    pub fn text(name: &str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// Shorthand for a datetime column.
    pub fn datetime(name: &str) -> Self {
        Self::new(name, ColumnType::Datetime)
    }

    /// Shorthand for a boolean column.
    pub fn bool(name: &str) -> Self {
        Self::new(name, ColumnType::Bool)
    }

    /// Shorthand for a floating point column.
    pub fn float(name: &str) -> Self {
        Self::new(name, ColumnType::Float)
    }

    /// Shorthand for an integer foreign key to `table (id)`.
    pub fn reference(name: &str, table: &str) -> Self {
        Self::integer(name).references(table)
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn references(mut self, table: &str) -> Self {
        self.references = Some(table.into());
        self
    }

    /// Converts one attribute of a fetched record into the value stored in
    /// this column.
    ///
    /// An absent or `null` attribute stays `NULL` only in a nullable column;
    /// otherwise it becomes the type's [zero value](ColumnType::zero_value).
    pub fn convert(&self, raw: Option<&JsonValue>) -> Value {
        match self.column_type.convert(raw) {
            Value::Null if !self.nullable => self.column_type.zero_value(),
            value => value,
        }
    }

    /// Renders the constraint part of the column definition.
    pub fn constraints(&self) -> String {
        if self.primary_key {
            return "NOT NULL PRIMARY KEY AUTOINCREMENT".into();
        }
        let mut out = String::from(if self.nullable { "NULL" } else { "NOT NULL" });
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if let Some(table) = &self.references {
            out.push_str(&format!(" REFERENCES {table} (id)"));
        }
        out
    }

    /// Renders `name type constraints`.
    pub fn definition(&self) -> String {
        format!("{} {} {}", self.name, self.column_type, self.constraints())
    }
}
