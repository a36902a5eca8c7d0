use crate::schema::{check_declared_columns, check_new_table, SchemaExecutor, TableRecord, ViewRecord};
use crate::{debug, info, StrataError};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

type CatalogTable = TableDefinition<'static, &'static str, &'static str>;

const TABLES: CatalogTable = TableDefinition::new("strata_tables");
const VIEWS: CatalogTable = TableDefinition::new("strata_views");

/// Full content of the recorded catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, TableRecord>,
    pub views: BTreeMap<String, ViewRecord>,
}

impl SchemaSnapshot {
    pub fn to_json(&self) -> Result<String, StrataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// CREATE VIEW statements in name order.
    pub fn view_statements(&self) -> Vec<String> {
        self.views.iter().map(|(name, view)| format!("CREATE VIEW {} AS {}", name, view.query)).collect()
    }
}

/// Schema catalog recorded in a redb database; every mutation is one committed write transaction.
pub struct SnapshotSchema {
    db: Database,
    path: PathBuf,
}

impl SnapshotSchema {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StrataError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let existed = path.exists();
        let db = Database::create(&path)?;
        let tx = db.begin_write()?;
        {
            tx.open_table(TABLES)?;
            tx.open_table(VIEWS)?;
        }
        tx.commit()?;
        if existed {
            info!("Opened schema snapshot at {:?}", path);
        } else {
            info!("Created schema snapshot at {:?}", path);
        }
        Ok(Self { db, path })
    }

    pub fn temp(name: &str) -> Result<Self, StrataError> {
        let path = env::temp_dir().join("strata").join(format!("{}_{}.redb", name, rand::random::<u64>()));
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_table<S: AsRef<str>>(&mut self, name: &str, columns: &[S]) -> Result<(), StrataError> {
        if self.relation_exists(name)? {
            return Err(StrataError::schema(format!("relation `{}` already exists", name)));
        }
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        check_new_table(name, &columns)?;
        self.put(TABLES, name, &TableRecord { columns })
    }

    pub fn drop_table(&mut self, name: &str) -> Result<(), StrataError> {
        if !self.remove(TABLES, name)? {
            return Err(StrataError::schema(format!("table `{}` does not exist", name)));
        }
        Ok(())
    }

    pub fn add_column(&mut self, table: &str, column: &str) -> Result<(), StrataError> {
        let mut record = self.table_record(table)?;
        if record.columns.iter().any(|c| c == column) {
            return Err(StrataError::schema(format!("column `{}` already exists on `{}`", column, table)));
        }
        record.columns.push(column.to_string());
        self.put(TABLES, table, &record)
    }

    pub fn remove_column(&mut self, table: &str, column: &str) -> Result<(), StrataError> {
        let mut record = self.table_record(table)?;
        let before = record.columns.len();
        record.columns.retain(|c| c != column);
        if record.columns.len() == before {
            return Err(StrataError::schema(format!("column `{}` does not exist on `{}`", column, table)));
        }
        self.put(TABLES, table, &record)
    }

    pub fn view(&self, name: &str) -> Result<Option<ViewRecord>, StrataError> {
        self.get(VIEWS, name)
    }

    pub fn snapshot(&self) -> Result<SchemaSnapshot, StrataError> {
        Ok(SchemaSnapshot { tables: self.all(TABLES)?, views: self.all(VIEWS)? })
    }

    fn table_record(&self, table: &str) -> Result<TableRecord, StrataError> {
        self.get(TABLES, table)?
            .ok_or_else(|| StrataError::schema(format!("table `{}` does not exist", table)))
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, def: CatalogTable, name: &str) -> Result<Option<T>, StrataError> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(def)?;
        let found = table.get(name)?;
        let decoded = match found {
            Some(guard) => Some(serde_json::from_str(guard.value())?),
            None => None,
        };
        Ok(decoded)
    }

    fn all<T: for<'de> Deserialize<'de>>(&self, def: CatalogTable) -> Result<BTreeMap<String, T>, StrataError> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(def)?;
        let mut out = BTreeMap::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            out.insert(key.value().to_string(), serde_json::from_str(value.value())?);
        }
        Ok(out)
    }

    fn put<T: Serialize>(&self, def: CatalogTable, name: &str, record: &T) -> Result<(), StrataError> {
        let encoded = serde_json::to_string(record)?;
        let tx = self.db.begin_write()?;
        {
            let mut table = tx.open_table(def)?;
            table.insert(name, encoded.as_str())?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, def: CatalogTable, name: &str) -> Result<bool, StrataError> {
        let tx = self.db.begin_write()?;
        let removed = {
            let mut table = tx.open_table(def)?;
            let removed = table.remove(name)?.is_some();
            removed
        };
        tx.commit()?;
        Ok(removed)
    }

    fn contains(&self, def: CatalogTable, name: &str) -> Result<bool, StrataError> {
        let tx = self.db.begin_read()?;
        let table = tx.open_table(def)?;
        let found = table.get(name)?.is_some();
        Ok(found)
    }
}

impl SchemaExecutor for SnapshotSchema {
    fn create_view(&mut self, name: &str, source_query: &str, declared_columns: &[String]) -> Result<(), StrataError> {
        if self.relation_exists(name)? {
            return Err(StrataError::schema(format!("relation `{}` already exists", name)));
        }
        check_declared_columns(name, declared_columns)?;
        self.put(VIEWS, name, &ViewRecord { query: source_query.to_string(), columns: declared_columns.to_vec() })?;
        debug!("Recorded view {} in snapshot {:?}", name, self.path);
        Ok(())
    }

    fn drop_view(&mut self, name: &str) -> Result<(), StrataError> {
        if !self.remove(VIEWS, name)? {
            return Err(StrataError::schema(format!("view `{}` does not exist", name)));
        }
        debug!("Removed view {} from snapshot {:?}", name, self.path);
        Ok(())
    }

    fn view_exists(&self, name: &str) -> Result<bool, StrataError> {
        self.contains(VIEWS, name)
    }

    fn table_exists(&self, name: &str) -> Result<bool, StrataError> {
        self.contains(TABLES, name)
    }

    fn reload_columns(&mut self, name: &str) -> Result<Vec<String>, StrataError> {
        if let Some(table) = self.get::<TableRecord>(TABLES, name)? {
            return Ok(table.columns);
        }
        if let Some(view) = self.get::<ViewRecord>(VIEWS, name)? {
            return Ok(view.columns);
        }
        Err(StrataError::schema(format!("relation `{}` does not exist", name)))
    }
}
