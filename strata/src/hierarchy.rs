use crate::behavior::Behavior;
use crate::naming::{NamingPolicy, PrefixNaming};
use crate::schema::SchemaExecutor;
use crate::{debug, StrataError, DEFAULT_TYPE_COLUMN};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Longest table, view or column name accepted at registration.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// What a type inherits from: the storage base itself, or another hierarchy type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Superclass {
    Base,
    Type(String),
}

impl Superclass {
    pub fn of<T: HierarchyType>() -> Self {
        Superclass::Type(T::declaration().name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub superclass: Superclass,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, superclass: Superclass) -> Self {
        Self { name: name.into(), superclass }
    }

    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, Superclass::Base)
    }

    pub fn child(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, Superclass::Type(parent.into()))
    }
}

/// Options accepted when a type joins a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Column holding the concrete type tag of each row.
    pub identity_column_name: String,
    /// Base name of the read table; derived from the type name when absent.
    pub read_table_name: Option<String>,
    pub writable_table_name_override: Option<String>,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self { identity_column_name: DEFAULT_TYPE_COLUMN.to_string(), read_table_name: None, writable_table_name_override: None }
    }
}

impl RegisterOptions {
    pub fn identity_column_name(mut self, column: impl Into<String>) -> Self {
        self.identity_column_name = column.into();
        self
    }

    pub fn read_table_name(mut self, table: impl Into<String>) -> Self {
        self.read_table_name = Some(table.into());
        self
    }

    pub fn writable_table(mut self, table: impl Into<String>) -> Self {
        self.writable_table_name_override = Some(table.into());
        self
    }
}

/// Implemented by types that can join a hierarchy, usually through `#[derive(HierarchyType)]`.
pub trait HierarchyType {
    fn declaration() -> TypeDecl;

    fn options() -> RegisterOptions {
        RegisterOptions::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCache {
    columns: Option<Vec<String>>,
}

impl ColumnCache {
    pub fn get(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn invalidate(&mut self) {
        self.columns = None;
    }

    pub fn reload<S: SchemaExecutor + ?Sized>(&mut self, table: &str, schema: &mut S) -> Result<&[String], StrataError> {
        self.invalidate();
        debug!("Resetting column information on {}", table);
        let columns = schema.reload_columns(table)?;
        Ok(self.columns.insert(columns).as_slice())
    }

    pub(crate) fn set(&mut self, columns: Vec<String>) {
        self.columns = Some(columns);
    }
}

/// Rule applied to a record before it is first inserted into a writable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateRule {
    /// A zero identity comes from a view-side default; drop it so the storage generates one.
    NullifyZeroIdentity,
}

impl CreateRule {
    pub fn apply(&self, id: Option<i64>) -> Option<i64> {
        match self {
            CreateRule::NullifyZeroIdentity => id.filter(|id| *id != 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableDescriptor {
    pub table: String,
    pub columns: ColumnCache,
    pub on_create: Vec<CreateRule>,
}

impl WritableDescriptor {
    fn new(table: String, on_create: Vec<CreateRule>) -> Self {
        Self { table, columns: ColumnCache::default(), on_create }
    }

    pub fn prepare_insert(&self, id: Option<i64>) -> Option<i64> {
        self.on_create.iter().fold(id, |id, rule| rule.apply(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub identity_column_name: String,
    pub read_table: String,
    pub writable: WritableDescriptor,
    pub parent: Option<String>,
    pub behavior: Behavior,
    pub read_columns: ColumnCache,
}

impl TypeDescriptor {
    pub fn is_root(&self) -> bool {
        self.behavior.is_root()
    }

    pub fn writable_table(&self) -> &str {
        &self.writable.table
    }
}

/// Fully-qualified reference to a column of a type's read table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Explicit registry of every type taking part in class-table inheritance.
pub struct Hierarchy {
    naming: Box<dyn NamingPolicy>,
    types: BTreeMap<String, TypeDescriptor>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::with_naming(PrefixNaming::default())
    }

    pub fn with_naming(naming: impl NamingPolicy + 'static) -> Self {
        Self { naming: Box::new(naming), types: BTreeMap::new() }
    }

    pub fn register_type<T: HierarchyType>(&mut self) -> Result<&TypeDescriptor, StrataError> {
        self.register(T::declaration(), T::options())
    }

    pub fn register(&mut self, decl: TypeDecl, options: RegisterOptions) -> Result<&TypeDescriptor, StrataError> {
        validate_type_name(&decl.name)?;
        if self.types.contains_key(&decl.name) {
            return Err(StrataError::configuration(format!("type `{}` is already registered", decl.name)));
        }
        if let Superclass::Type(parent) = &decl.superclass {
            validate_type_name(parent)?;
            if parent == &decl.name {
                return Err(StrataError::configuration(format!("type `{}` cannot inherit from itself", decl.name)));
            }
        }
        validate_identifier("identity column", &options.identity_column_name)?;

        let table_name = match &options.read_table_name {
            Some(table) => table.clone(),
            None => self.naming.default_table_name(&decl.name),
        };
        validate_identifier("table", &table_name)?;

        let behavior = Behavior::select(&decl.superclass);
        let (read_table, writable) = match behavior {
            Behavior::Root => {
                debug!("Root type {}, table_name -> {}", decl.name, table_name);
                if let Some(writable) = &options.writable_table_name_override {
                    if writable != &table_name {
                        return Err(StrataError::configuration(format!(
                            "root type `{}` is written through its read table `{}`, not `{}`",
                            decl.name, table_name, writable
                        )));
                    }
                }
                let writable = WritableDescriptor::new(table_name.clone(), Vec::new());
                (table_name, writable)
            }
            Behavior::Child => {
                let view_name = self.naming.view_name(&table_name);
                let writable_table = match &options.writable_table_name_override {
                    Some(table) => table.clone(),
                    None => self.naming.writable_table_name(&view_name),
                };
                debug!("Child type {}, table_name (view) -> {}, writable -> {}", decl.name, view_name, writable_table);
                validate_identifier("view", &view_name)?;
                validate_identifier("writable table", &writable_table)?;
                if writable_table == view_name {
                    return Err(StrataError::configuration(format!(
                        "child type `{}` needs a writable table distinct from its view `{}`",
                        decl.name, view_name
                    )));
                }
                let writable = WritableDescriptor::new(writable_table, vec![CreateRule::NullifyZeroIdentity]);
                (view_name, writable)
            }
        };
        self.ensure_unclaimed(&decl.name, &read_table)?;
        self.ensure_unclaimed(&decl.name, &writable.table)?;

        let parent = match decl.superclass {
            Superclass::Base => None,
            Superclass::Type(parent) => Some(parent),
        };
        let descriptor = TypeDescriptor {
            name: decl.name.clone(),
            identity_column_name: options.identity_column_name,
            read_table,
            writable,
            parent,
            behavior,
            read_columns: ColumnCache::default(),
        };
        Ok(self.types.entry(decl.name).or_insert(descriptor))
    }

    /// Removes a type; children keep naming it as their parent.
    pub fn unregister(&mut self, name: &str) -> Result<TypeDescriptor, StrataError> {
        self.types.remove(name).ok_or_else(|| not_registered(name))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Result<&TypeDescriptor, StrataError> {
        self.types.get(name).ok_or_else(|| not_registered(name))
    }

    pub(crate) fn descriptor_mut(&mut self, name: &str) -> Result<&mut TypeDescriptor, StrataError> {
        self.types.get_mut(name).ok_or_else(|| not_registered(name))
    }

    pub fn behavior_profile(&self, name: &str) -> Result<Behavior, StrataError> {
        Ok(self.descriptor(name)?.behavior)
    }

    pub fn parent_of(&self, name: &str) -> Result<&TypeDescriptor, StrataError> {
        let descriptor = self.descriptor(name)?;
        let parent = descriptor
            .parent
            .as_deref()
            .ok_or_else(|| StrataError::MissingParent { type_name: name.to_string(), parent: None })?;
        self.types
            .get(parent)
            .ok_or_else(|| StrataError::MissingParent { type_name: name.to_string(), parent: Some(parent.to_string()) })
    }

    /// The type itself followed by its ancestors up to the root.
    pub fn lineage(&self, name: &str) -> Result<Vec<&TypeDescriptor>, StrataError> {
        let mut chain = vec![self.descriptor(name)?];
        let mut seen = BTreeSet::from([name.to_string()]);
        while let Some(current) = chain.last().copied() {
            if current.is_root() {
                break;
            }
            let parent = self.parent_of(&current.name)?;
            if !seen.insert(parent.name.clone()) {
                return Err(StrataError::configuration(format!("inheritance cycle through `{}`", parent.name)));
            }
            chain.push(parent);
        }
        Ok(chain)
    }

    pub fn depth(&self, name: &str) -> Result<usize, StrataError> {
        Ok(self.lineage(name)?.len() - 1)
    }

    pub fn root_of(&self, name: &str) -> Result<&TypeDescriptor, StrataError> {
        let lineage = self.lineage(name)?;
        lineage.last().copied().ok_or_else(|| not_registered(name))
    }

    /// Every registered type, parents before children, ties broken by name.
    pub fn root_to_leaf(&self) -> Result<Vec<&TypeDescriptor>, StrataError> {
        let mut ordered = Vec::with_capacity(self.types.len());
        for descriptor in self.types.values() {
            ordered.push((self.depth(&descriptor.name)?, descriptor));
        }
        ordered.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| a.name.cmp(&b.name)));
        Ok(ordered.into_iter().map(|(_, d)| d).collect())
    }

    pub fn children_of(&self, name: &str) -> Vec<&TypeDescriptor> {
        self.types.values().filter(|d| d.parent.as_deref() == Some(name)).collect()
    }

    /// `read_table.column` reference usable in queries against the type.
    pub fn column(&self, name: &str, column: &str) -> Result<QualifiedColumn, StrataError> {
        let descriptor = self.descriptor(name)?;
        if let Some(columns) = descriptor.read_columns.get() {
            if !columns.iter().any(|c| c == column) {
                return Err(StrataError::configuration(format!("`{}` has no column `{}`", descriptor.read_table, column)));
            }
        }
        Ok(QualifiedColumn { table: descriptor.read_table.clone(), column: column.to_string() })
    }

    fn ensure_unclaimed(&self, type_name: &str, table: &str) -> Result<(), StrataError> {
        let owner = self.types.values().find(|d| d.read_table == table || d.writable.table == table);
        match owner {
            Some(owner) => Err(StrataError::configuration(format!(
                "table `{}` of `{}` is already used by `{}`",
                table, type_name, owner.name
            ))),
            None => Ok(()),
        }
    }
}

fn not_registered(name: &str) -> StrataError {
    StrataError::configuration(format!("type `{}` is not registered in the hierarchy", name))
}

fn validate_type_name(name: &str) -> Result<(), StrataError> {
    if name.trim().is_empty() {
        return Err(StrataError::configuration("type name is empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(StrataError::configuration(format!("type name `{}` contains whitespace", name)));
    }
    Ok(())
}

fn validate_identifier(kind: &str, ident: &str) -> Result<(), StrataError> {
    if ident.is_empty() {
        return Err(StrataError::configuration(format!("{} name is empty", kind)));
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(StrataError::configuration(format!(
            "{} name `{}` exceeds max length {}",
            kind, ident, MAX_IDENTIFIER_LEN
        )));
    }
    if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StrataError::configuration(format!("{} name `{}` must be ASCII alphanumeric or `_`", kind, ident)));
    }
    Ok(())
}
