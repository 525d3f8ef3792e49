use crate::column::Column;
use pdbsync_types::{Record, Value};

/// Schema of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    /// Columns in declared order, `id` first.
    pub columns: Vec<Column>,
    /// Columns forming a composite `UNIQUE` constraint (may be empty).
    pub uniqueness: Vec<String>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            uniqueness: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_uniqueness(mut self, columns: &[&str]) -> Self {
        self.uniqueness = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in declared order, without `id`.
    pub fn column_names(&self) -> Vec<&str> {
        self.data_columns().map(|c| c.name.as_str()).collect()
    }

    /// Maps a record onto this table's columns.
    ///
    /// Returns one value per entry of [`Table::column_names`], in the same
    /// order. Attributes the record lacks are `NULL` in nullable columns and
    /// the type's zero value elsewhere.
    pub fn row_values(&self, record: &Record) -> Vec<Value> {
        self.data_columns()
            .map(|c| c.convert(record.get(&c.name)))
            .collect()
    }

    /// Renders the `CREATE TABLE` statement.
    pub fn create_statement(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.definition()))
            .collect();
        if !self.uniqueness.is_empty() {
            lines.push(format!("  UNIQUE ({})", self.uniqueness.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            lines.join(",\n")
        )
    }

    fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.name != "id")
    }
}
