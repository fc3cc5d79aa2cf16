//! Relation identifiers (database.schema.identifier)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of object a relation names in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Table,
    View,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-qualified table or view in the target warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Database/project name
    #[serde(default)]
    pub database: Option<String>,

    /// Schema/dataset name
    pub schema: String,

    /// Table or view name
    pub identifier: String,
}

impl Relation {
    /// Create a relation without a database component
    pub fn new(schema: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: schema.into(),
            identifier: identifier.into(),
        }
    }

    /// Set the database component
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Copy of this relation moved to another schema/identifier
    pub fn renamed(&self, schema: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            database: self.database.clone(),
            schema: schema.into(),
            identifier: identifier.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        match &self.database {
            Some(database) => format!("{}.{}.{}", database, self.schema, self.identifier),
            None => format!("{}.{}", self.schema, self.identifier),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

impl FromStr for Relation {
    type Err = RelationError;

    /// Parse `schema.identifier` or `database.schema.identifier`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();

        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(RelationError::EmptyComponent(s.to_string()));
        }

        match parts.as_slice() {
            [schema, identifier] => Ok(Relation::new(*schema, *identifier)),
            [database, schema, identifier] => {
                Ok(Relation::new(*schema, *identifier).with_database(*database))
            }
            _ => Err(RelationError::InvalidParts {
                input: s.to_string(),
                parts: parts.len(),
            }),
        }
    }
}

/// Relation parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    #[error("Relation '{input}' has {parts} dot-separated parts, expected 2 or 3")]
    InvalidParts { input: String, parts: usize },

    #[error("Relation '{0}' has an empty component")]
    EmptyComponent(String),
}
