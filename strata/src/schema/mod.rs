pub mod memory;
pub mod snapshot;

use crate::StrataError;
use serde::{Deserialize, Serialize};

/// Schema-management collaborator executing and recording view DDL.
///
/// Every call either fully succeeds or returns an error; no call is left half-applied.
pub trait SchemaExecutor {
    fn create_view(&mut self, name: &str, source_query: &str, declared_columns: &[String]) -> Result<(), StrataError>;
    fn drop_view(&mut self, name: &str) -> Result<(), StrataError>;
    fn view_exists(&self, name: &str) -> Result<bool, StrataError>;
    fn table_exists(&self, name: &str) -> Result<bool, StrataError>;
    /// Ordered column names of a table or a view, read fresh from the catalog.
    fn reload_columns(&mut self, name: &str) -> Result<Vec<String>, StrataError>;

    fn relation_exists(&self, name: &str) -> Result<bool, StrataError> {
        Ok(self.table_exists(name)? || self.view_exists(name)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub query: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub columns: Vec<String>,
}

/// Rejects view definitions a database would refuse as ambiguous.
pub(crate) fn check_declared_columns(name: &str, declared_columns: &[String]) -> Result<(), StrataError> {
    if declared_columns.is_empty() {
        return Err(StrataError::schema(format!("view `{}` declares no columns", name)));
    }
    for (idx, column) in declared_columns.iter().enumerate() {
        if declared_columns[..idx].contains(column) {
            return Err(StrataError::schema(format!("view `{}` declares column `{}` more than once", name, column)));
        }
    }
    Ok(())
}

pub(crate) fn check_new_table(name: &str, columns: &[String]) -> Result<(), StrataError> {
    if columns.is_empty() {
        return Err(StrataError::schema(format!("table `{}` must have at least one column", name)));
    }
    for (idx, column) in columns.iter().enumerate() {
        if columns[..idx].contains(column) {
            return Err(StrataError::schema(format!("table `{}` declares column `{}` more than once", name, column)));
        }
    }
    Ok(())
}
