use crate::table::Table;

/// A secondary index on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub table: String,
    pub column: String,
}

impl Index {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Index name, `<table>_<column>`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.table, self.column)
    }

    pub fn create_statement(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
            self.name(),
            self.table,
            self.column
        )
    }
}

/// All tables and indexes of the local store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub indexes: Vec<Index>,
}

impl Schema {
    pub fn new(tables: Vec<Table>, indexes: Vec<Index>) -> Self {
        Self { tables, indexes }
    }

    /// Looks a table up by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// DDL for the whole schema: every table, then every index.
    pub fn create_statements(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&table.create_statement());
            out.push_str("\n\n");
        }
        for index in &self.indexes {
            out.push_str(&index.create_statement());
            out.push('\n');
        }
        out
    }
}
