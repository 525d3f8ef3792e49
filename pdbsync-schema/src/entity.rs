/// One synchronizable kind of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    /// Stable identifier, also the task key in the scheduler.
    pub name: String,
    /// Human readable label used in logs and progress output.
    pub display_name: String,
    /// Resource path segment of the remote API (`org`, `fac`, ...).
    pub api_tag: String,
    /// Local table holding this entity's rows.
    pub table: String,
    /// Entity types that must be synchronized before this one.
    pub depends_on: Vec<String>,
}

impl EntityType {
    pub fn new(name: &str, display_name: &str, api_tag: &str, table: &str) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            api_tag: api_tag.into(),
            table: table.into(),
            depends_on: Vec::new(),
        }
    }

    #[must_use]
    pub fn depends_on(mut self, entities: &[&str]) -> Self {
        self.depends_on = entities.iter().map(|e| (*e).to_string()).collect();
        self
    }
}
