use crate::hierarchy::Hierarchy;
use crate::schema::SchemaExecutor;
use crate::settings::ReconcileSettings;
use crate::view::{drop_view_sql, ViewBuilder, ViewDefinition};
use crate::{debug, warn, StrataError};

/// Outcome of an idempotent reconciliation.
#[derive(Debug)]
pub enum Reconciliation {
    Created(ViewDefinition),
    Updated(ViewDefinition),
    /// Nothing to update; carries `StrataError::ViewAbsent`.
    Skipped(StrataError),
}

impl Reconciliation {
    pub fn definition(&self) -> Option<&ViewDefinition> {
        match self {
            Reconciliation::Created(def) | Reconciliation::Updated(def) => Some(def),
            Reconciliation::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Reconciliation::Skipped(_))
    }
}

/// Creates, drops and refreshes the read view of one child type at a time.
pub struct ViewReconciler<'a, S: SchemaExecutor> {
    hierarchy: &'a mut Hierarchy,
    schema: &'a mut S,
    builder: ViewBuilder,
}

impl<'a, S: SchemaExecutor> ViewReconciler<'a, S> {
    pub fn new(hierarchy: &'a mut Hierarchy, schema: &'a mut S) -> Self {
        Self { hierarchy, schema, builder: ViewBuilder::default() }
    }

    pub fn with_settings(hierarchy: &'a mut Hierarchy, schema: &'a mut S, settings: &ReconcileSettings) -> Self {
        Self { hierarchy, schema, builder: ViewBuilder::new(settings.detect_column_collisions) }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &*self.hierarchy
    }

    pub fn schema(&self) -> &S {
        &*self.schema
    }

    pub fn view_exists(&self, type_name: &str) -> Result<bool, StrataError> {
        let view = self.view_name(type_name)?;
        self.schema.view_exists(&view)
    }

    pub fn create(&mut self, type_name: &str) -> Result<ViewDefinition, StrataError> {
        let definition = self.builder.build(&mut *self.hierarchy, &mut *self.schema, type_name)?;
        debug!("Creating view -> {}", definition.create_sql());
        self.schema.create_view(&definition.view_name, &definition.source_query, &definition.declared_columns())?;
        Ok(definition)
    }

    pub fn drop(&mut self, type_name: &str) -> Result<(), StrataError> {
        let view = self.view_name(type_name)?;
        debug!("Dropping view -> {}", drop_view_sql(&view));
        self.schema.drop_view(&view)
    }

    pub fn update(&mut self, type_name: &str) -> Result<Reconciliation, StrataError> {
        let view = self.view_name(type_name)?;
        if !self.schema.view_exists(&view)? {
            let absent = StrataError::ViewAbsent { view };
            warn!("Cannot update view for {}: {}", type_name, absent);
            return Ok(Reconciliation::Skipped(absent));
        }
        let definition = self.builder.build(&mut *self.hierarchy, &mut *self.schema, type_name)?;
        debug!("Updating view -> {}", definition.create_sql());
        self.schema.drop_view(&view)?;
        self.schema.create_view(&definition.view_name, &definition.source_query, &definition.declared_columns())?;
        Ok(Reconciliation::Updated(definition))
    }

    pub fn create_or_update(&mut self, type_name: &str) -> Result<Reconciliation, StrataError> {
        let view = self.view_name(type_name)?;
        if self.schema.view_exists(&view)? {
            self.update(type_name)
        } else {
            debug!("View {} does not exist, creating it", view);
            Ok(Reconciliation::Created(self.create(type_name)?))
        }
    }

    fn view_name(&self, type_name: &str) -> Result<String, StrataError> {
        let descriptor = self.hierarchy.descriptor(type_name)?;
        if descriptor.is_root() {
            return Err(StrataError::MissingParent { type_name: type_name.to_string(), parent: None });
        }
        Ok(descriptor.read_table.clone())
    }
}
