//! Table schemas applied when a resource is acquired.

use crate::errors::ResourceError;
use serde::{Deserialize, Serialize};

/// Column layout of a single table, applied with `CREATE TABLE IF NOT EXISTS`.
///
/// Column types are passed through verbatim, so they may carry constraints
/// such as `INTEGER PRIMARY KEY AUTOINCREMENT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// The table name.
    pub table: String,
    /// Column name and SQL type pairs, in declaration order.
    #[serde(default)]
    pub columns: Vec<(String, String)>,
}

impl TableSchema {
    /// Creates a schema for a table with no columns yet.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), sql_type.into()));
        self
    }

    /// Returns the column names, in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Checks that the schema can be turned into a statement.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty table name, no columns, or an unnamed
    /// or duplicated column.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let invalid = |reason: &str| ResourceError::InvalidSchema {
            table: self.table.clone(),
            reason: reason.to_string(),
        };

        if self.table.trim().is_empty() {
            return Err(invalid("table name cannot be empty"));
        }
        if self.columns.is_empty() {
            return Err(invalid("at least one column is required"));
        }
        for (index, (name, _)) in self.columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(invalid("column names cannot be empty"));
            }
            if self.columns[..index].iter().any(|(other, _)| other == name) {
                return Err(invalid(&format!("column '{name}' is declared twice")));
            }
        }
        Ok(())
    }

    /// Renders the idempotent create statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is invalid.
    pub fn create_statement(&self) -> Result<String, ResourceError> {
        self.validate()?;

        let columns = self
            .columns
            .iter()
            .map(|(name, sql_type)| format!("{} {}", quote_ident(name), sql_type.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({columns})",
            quote_ident(&self.table)
        ))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candles() -> TableSchema {
        TableSchema::new("candles")
            .column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
            .column("Date", "TEXT")
            .column("Close", "REAL")
    }

    #[test]
    fn test_create_statement() {
        assert_eq!(
            candles().create_statement().unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "candles" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "Date" TEXT, "Close" REAL)"#
        );
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let schema = TableSchema::new("odd\"name").column("a b", "TEXT");
        assert_eq!(
            schema.create_statement().unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "odd""name" ("a b" TEXT)"#
        );
    }

    #[test]
    fn test_invalid_schemas() {
        assert!(TableSchema::new("").column("a", "TEXT").validate().is_err());
        assert!(TableSchema::new("t").validate().is_err());
        assert!(TableSchema::new("t").column(" ", "TEXT").validate().is_err());
        assert!(TableSchema::new("t")
            .column("a", "TEXT")
            .column("a", "REAL")
            .validate()
            .is_err());
    }

    #[test]
    fn test_column_names() {
        let schema = candles();
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names, vec!["id", "Date", "Close"]);
    }
}
