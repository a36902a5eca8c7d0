use crate::hierarchy::Hierarchy;
use crate::reconciler::{Reconciliation, ViewReconciler};
use crate::schema::SchemaExecutor;
use crate::settings::ReconcileSettings;
use crate::{error, info, StrataError};

/// Reconciles the views of every child type, parents before children.
pub struct Migrator<'a, S: SchemaExecutor> {
    reconciler: ViewReconciler<'a, S>,
}

impl<'a, S: SchemaExecutor> Migrator<'a, S> {
    pub fn new(hierarchy: &'a mut Hierarchy, schema: &'a mut S) -> Self {
        Self { reconciler: ViewReconciler::new(hierarchy, schema) }
    }

    pub fn with_settings(hierarchy: &'a mut Hierarchy, schema: &'a mut S, settings: &ReconcileSettings) -> Self {
        Self { reconciler: ViewReconciler::with_settings(hierarchy, schema, settings) }
    }

    pub fn reconciler(&mut self) -> &mut ViewReconciler<'a, S> {
        &mut self.reconciler
    }

    fn child_types(&self) -> Result<Vec<String>, StrataError> {
        Ok(self
            .reconciler
            .hierarchy()
            .root_to_leaf()?
            .into_iter()
            .filter(|d| !d.is_root())
            .map(|d| d.name.clone())
            .collect())
    }

    pub fn create_or_update_all(&mut self) -> Result<Vec<(String, Reconciliation)>, StrataError> {
        let order = self.child_types()?;
        let mut results = Vec::with_capacity(order.len());
        for name in order {
            match self.reconciler.create_or_update(&name) {
                Ok(outcome) => results.push((name, outcome)),
                Err(err) => {
                    error!("Reconciling view of {} failed after {} views: {}", name, results.len(), err);
                    return Err(err);
                }
            }
        }
        info!("Reconciled {} views", results.len());
        Ok(results)
    }

    /// Drops existing child views leaf first; returns the dropped type names.
    pub fn drop_all(&mut self) -> Result<Vec<String>, StrataError> {
        let mut order = self.child_types()?;
        order.reverse();
        let mut dropped = Vec::new();
        for name in order {
            if self.reconciler.view_exists(&name)? {
                if let Err(err) = self.reconciler.drop(&name) {
                    error!("Dropping view of {} failed: {}", name, err);
                    return Err(err);
                }
                dropped.push(name);
            }
        }
        info!("Dropped {} views", dropped.len());
        Ok(dropped)
    }
}
