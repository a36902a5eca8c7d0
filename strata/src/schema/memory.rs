use crate::schema::{check_declared_columns, check_new_table, SchemaExecutor, TableRecord, ViewRecord};
use crate::StrataError;
use std::collections::BTreeMap;

/// Schema catalog held in memory, used for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySchema {
    tables: BTreeMap<String, TableRecord>,
    views: BTreeMap<String, ViewRecord>,
    reloads: Vec<String>,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table<S: AsRef<str>>(&mut self, name: &str, columns: &[S]) -> Result<(), StrataError> {
        if self.tables.contains_key(name) || self.views.contains_key(name) {
            return Err(StrataError::schema(format!("relation `{}` already exists", name)));
        }
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        check_new_table(name, &columns)?;
        self.tables.insert(name.to_string(), TableRecord { columns });
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<(), StrataError> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StrataError::schema(format!("table `{}` does not exist", name)))
    }

    pub fn add_column(&mut self, table: &str, column: &str) -> Result<(), StrataError> {
        let record = self.table_mut(table)?;
        if record.columns.iter().any(|c| c == column) {
            return Err(StrataError::schema(format!("column `{}` already exists on `{}`", column, table)));
        }
        record.columns.push(column.to_string());
        Ok(())
    }

    pub fn remove_column(&mut self, table: &str, column: &str) -> Result<(), StrataError> {
        let record = self.table_mut(table)?;
        let before = record.columns.len();
        record.columns.retain(|c| c != column);
        if record.columns.len() == before {
            return Err(StrataError::schema(format!("column `{}` does not exist on `{}`", column, table)));
        }
        Ok(())
    }

    pub fn view(&self, name: &str) -> Option<&ViewRecord> {
        self.views.get(name)
    }

    /// Names passed to `reload_columns`, in call order.
    pub fn reload_log(&self) -> &[String] {
        &self.reloads
    }

    pub fn clear_reload_log(&mut self) {
        self.reloads.clear();
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut TableRecord, StrataError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StrataError::schema(format!("table `{}` does not exist", table)))
    }
}

impl SchemaExecutor for MemorySchema {
    fn create_view(&mut self, name: &str, source_query: &str, declared_columns: &[String]) -> Result<(), StrataError> {
        if self.tables.contains_key(name) || self.views.contains_key(name) {
            return Err(StrataError::schema(format!("relation `{}` already exists", name)));
        }
        check_declared_columns(name, declared_columns)?;
        self.views.insert(name.to_string(), ViewRecord { query: source_query.to_string(), columns: declared_columns.to_vec() });
        Ok(())
    }

    fn drop_view(&mut self, name: &str) -> Result<(), StrataError> {
        self.views
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StrataError::schema(format!("view `{}` does not exist", name)))
    }

    fn view_exists(&self, name: &str) -> Result<bool, StrataError> {
        Ok(self.views.contains_key(name))
    }

    fn table_exists(&self, name: &str) -> Result<bool, StrataError> {
        Ok(self.tables.contains_key(name))
    }

    fn reload_columns(&mut self, name: &str) -> Result<Vec<String>, StrataError> {
        self.reloads.push(name.to_string());
        if let Some(table) = self.tables.get(name) {
            return Ok(table.columns.clone());
        }
        if let Some(view) = self.views.get(name) {
            return Ok(view.columns.clone());
        }
        Err(StrataError::schema(format!("relation `{}` does not exist", name)))
    }
}
