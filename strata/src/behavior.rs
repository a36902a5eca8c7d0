use crate::hierarchy::{Hierarchy, Superclass};
use crate::StrataError;

/// Persistence profile of a type, fixed when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Root,
    Child,
}

impl Behavior {
    pub fn select(superclass: &Superclass) -> Self {
        match superclass {
            Superclass::Base => Behavior::Root,
            Superclass::Type(_) => Behavior::Child,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Behavior::Root)
    }

    pub fn reads_through_view(&self) -> bool {
        matches!(self, Behavior::Child)
    }

    /// Identity a fresh child record carries over from its view is `0`, which storage must not see.
    pub fn normalize_new_identity(&self, id: Option<i64>) -> Option<i64> {
        match self {
            Behavior::Root => id,
            Behavior::Child => id.filter(|id| *id != 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Generated,
    Inherited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStep {
    pub type_name: String,
    pub table: String,
    pub identity: IdentitySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistencePlan {
    pub type_name: String,
    pub steps: Vec<WriteStep>,
}

impl PersistencePlan {
    pub fn tables(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.table.as_str()).collect()
    }
}

impl Hierarchy {
    /// Table a record of the type is written to; never a view.
    pub fn write_target(&self, name: &str) -> Result<&str, StrataError> {
        Ok(self.descriptor(name)?.writable_table())
    }

    /// Writes from the root table down to the type's own writable table.
    pub fn save_plan(&self, name: &str) -> Result<PersistencePlan, StrataError> {
        let lineage = self.lineage(name)?;
        let steps = lineage
            .iter()
            .rev()
            .enumerate()
            .map(|(idx, descriptor)| WriteStep {
                type_name: descriptor.name.clone(),
                table: descriptor.writable_table().to_string(),
                identity: if idx == 0 { IdentitySource::Generated } else { IdentitySource::Inherited },
            })
            .collect();
        Ok(PersistencePlan { type_name: name.to_string(), steps })
    }

    pub fn delete_plan(&self, name: &str) -> Result<PersistencePlan, StrataError> {
        let mut plan = self.save_plan(name)?;
        plan.steps.reverse();
        Ok(plan)
    }
}
