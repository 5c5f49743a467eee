//! Value types held by the shared configuration's collections.
//!
//! The reload machinery never looks inside these; they exist so the six
//! collections are typed and so parser implementations have something
//! concrete to register.

/// What kind of SQL a mapped statement executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlCommand {
    Select,
    Insert,
    Update,
    Delete,
}

/// One executable statement, keyed by its qualified id (`namespace.id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatement {
    pub id: String,
    pub command: SqlCommand,
    pub sql: String,
    /// Qualified id of the result map shaping this statement's rows.
    pub result_map: Option<String>,
    /// Qualified id of the parameter map binding this statement's inputs.
    pub parameter_map: Option<String>,
}

impl MappedStatement {
    pub fn new(id: impl Into<String>, command: SqlCommand, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command,
            sql: sql.into(),
            result_map: None,
            parameter_map: None,
        }
    }
}

/// Maps result-set columns onto host object fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMap {
    pub id: String,
    pub mappings: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub column: String,
    pub field: String,
}

/// Positional parameter bindings for a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMap {
    pub id: String,
    pub parameters: Vec<String>,
}

/// Per-namespace query cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCache {
    pub id: String,
    pub size: usize,
}

/// Generated-key retrieval for insert statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenerator {
    pub id: String,
    pub column: String,
}

/// A reusable SQL fragment referenced by other statements in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub id: String,
    pub sql: String,
}
