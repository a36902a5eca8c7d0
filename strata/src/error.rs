use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrataError {

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{}", missing_parent_message(type_name, parent))]
    MissingParent { type_name: String, parent: Option<String> },

    #[error("Schema unavailable: table `{table}` required by `{type_name}` does not exist")]
    SchemaUnavailable { type_name: String, table: String },

    #[error("Column collision in view `{view}`: column `{column}` is both inherited and declared")]
    ColumnCollision { view: String, column: String },

    #[error("View `{view}` does not exist")]
    ViewAbsent { view: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

fn missing_parent_message(type_name: &str, parent: &Option<String>) -> String {
    match parent {
        Some(parent) => format!("Missing parent: `{}` declares parent `{}` which is not registered", type_name, parent),
        None => format!("Missing parent: `{}` is a hierarchy root and has no parent view", type_name),
    }
}

impl StrataError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        StrataError::Configuration(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        StrataError::Schema(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, StrataError::Configuration(_))
    }
}
