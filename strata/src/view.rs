use crate::hierarchy::Hierarchy;
use crate::schema::SchemaExecutor;
use crate::{debug, StrataError, ID_COLUMN};

/// Derived read view of a child type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    pub view_name: String,
    /// Inherited then own columns, identity excluded.
    pub columns: Vec<String>,
    pub source_query: String,
}

impl ViewDefinition {
    /// Columns the view exposes, identity first.
    pub fn declared_columns(&self) -> Vec<String> {
        std::iter::once(ID_COLUMN.to_string()).chain(self.columns.iter().cloned()).collect()
    }

    pub fn create_sql(&self) -> String {
        format!("CREATE VIEW {} AS {}", self.view_name, self.source_query)
    }

    pub fn drop_sql(&self) -> String {
        drop_view_sql(&self.view_name)
    }
}

pub fn drop_view_sql(view_name: &str) -> String {
    format!("DROP VIEW {}", view_name)
}

struct Link {
    name: String,
    read_table: String,
    writable_table: String,
    root: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewBuilder {
    detect_collisions: bool,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ViewBuilder {
    pub fn new(detect_collisions: bool) -> Self {
        Self { detect_collisions }
    }

    /// Derives the view of a child type from the live columns of its writable table and parent view.
    pub fn build<S: SchemaExecutor + ?Sized>(&self, hierarchy: &mut Hierarchy, schema: &mut S, type_name: &str) -> Result<ViewDefinition, StrataError> {
        let lineage: Vec<Link> = hierarchy
            .lineage(type_name)?
            .into_iter()
            .map(|d| Link { name: d.name.clone(), read_table: d.read_table.clone(), writable_table: d.writable.table.clone(), root: d.is_root() })
            .collect();
        let (own, ancestors) = match lineage.split_first() {
            Some((own, ancestors)) if !own.root => (own, ancestors),
            _ => return Err(StrataError::MissingParent { type_name: type_name.to_string(), parent: None }),
        };
        let parent = ancestors
            .first()
            .ok_or_else(|| StrataError::MissingParent { type_name: type_name.to_string(), parent: None })?;

        for link in &lineage {
            if !schema.table_exists(&link.writable_table)? {
                return Err(StrataError::SchemaUnavailable { type_name: type_name.to_string(), table: link.writable_table.clone() });
            }
        }
        for ancestor in ancestors.iter().filter(|a| !a.root) {
            if !schema.relation_exists(&ancestor.read_table)? {
                return Err(StrataError::SchemaUnavailable { type_name: type_name.to_string(), table: ancestor.read_table.clone() });
            }
        }

        let own_columns = self.refresh(hierarchy, schema, own, false)?.writable;
        let mut parent_columns = Vec::new();
        for (idx, ancestor) in ancestors.iter().enumerate() {
            let refreshed = self.refresh(hierarchy, schema, ancestor, true)?;
            if idx == 0 {
                parent_columns = refreshed.read;
            }
        }

        let mut columns: Vec<String> = parent_columns.iter().filter(|c| c.as_str() != ID_COLUMN).cloned().collect();
        let parent_count = columns.len();
        columns.extend(own_columns.iter().filter(|c| c.as_str() != ID_COLUMN).cloned());
        if self.detect_collisions {
            for (idx, column) in columns.iter().enumerate() {
                if columns[..idx].contains(column) {
                    return Err(StrataError::ColumnCollision { view: own.read_table.clone(), column: column.clone() });
                }
            }
        }

        let (inherited, declared) = columns.split_at(parent_count);
        let selected: Vec<String> = std::iter::once(format!("{}.{}", parent.read_table, ID_COLUMN))
            .chain(inherited.iter().map(|c| format!("{}.{}", parent.read_table, c)))
            .chain(declared.iter().map(|c| format!("{}.{}", own.writable_table, c)))
            .collect();
        let source_query = format!(
            "SELECT {} FROM {}, {} WHERE {}.{} = {}.{}",
            selected.join(", "),
            parent.read_table,
            own.writable_table,
            parent.read_table,
            ID_COLUMN,
            own.writable_table,
            ID_COLUMN
        );

        let definition = ViewDefinition { view_name: own.read_table.clone(), columns, source_query };
        debug!("View for {} -> {}", own.name, definition.create_sql());
        Ok(definition)
    }

    fn refresh<S: SchemaExecutor + ?Sized>(&self, hierarchy: &mut Hierarchy, schema: &mut S, link: &Link, with_read: bool) -> Result<Refreshed, StrataError> {
        let descriptor = hierarchy.descriptor_mut(&link.name)?;
        let writable = descriptor.writable.columns.reload(&link.writable_table, schema)?.to_vec();
        let read = if !with_read {
            Vec::new()
        } else if link.root {
            descriptor.read_columns.set(writable.clone());
            writable.clone()
        } else {
            descriptor.read_columns.reload(&link.read_table, schema)?.to_vec()
        };
        Ok(Refreshed { writable, read })
    }
}

struct Refreshed {
    writable: Vec<String>,
    read: Vec<String>,
}
