pub mod behavior;
pub mod error;
pub mod hierarchy;
pub mod logger;
pub mod migration;
pub mod naming;
pub mod reconciler;
pub mod schema;
pub mod settings;
pub mod view;

pub use behavior::{Behavior, IdentitySource, PersistencePlan, WriteStep};
pub use error::StrataError;
pub use hierarchy::{
    ColumnCache, CreateRule, Hierarchy, HierarchyType, QualifiedColumn, RegisterOptions, Superclass, TypeDecl, TypeDescriptor,
    WritableDescriptor,
};
pub use migration::Migrator;
pub use naming::{NamingPolicy, PrefixNaming, VIEW_PREFIX};
pub use reconciler::{Reconciliation, ViewReconciler};
pub use schema::memory::MemorySchema;
pub use schema::snapshot::{SchemaSnapshot, SnapshotSchema};
pub use schema::SchemaExecutor;
pub use settings::{load_settings, NamingSettings, ReconcileSettings, StrataSettings};
pub use strata_macros::HierarchyType;
pub use view::{ViewBuilder, ViewDefinition};

/// Identity column shared by a root table, every writable table and every view.
pub const ID_COLUMN: &str = "id";

/// Default discriminator column holding each row's concrete type.
pub const DEFAULT_TYPE_COLUMN: &str = "type";
