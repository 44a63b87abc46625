//! Inheritance Propagator
//!
//! Pushes inheritable field values from every root down its subtree. Edges
//! are visited parent-before-child, so a grandchild always reads the value
//! its parent has just received. Re-running on an unchanged store writes
//! nothing.

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldRegistry, FieldSpec};
use crate::storage::EventStore;

use super::errors::HierarchyResult;
use super::tree::EventTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Copy the parent's metadata block onto each child
    pub include_metadata: bool,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self { include_metadata: true }
    }
}

/// Outcome of one propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropagationReport {
    /// Parent nodes whose children were visited
    pub parents: usize,
    /// Child nodes visited
    pub children: usize,
    /// Field and metadata writes that changed a record
    pub writes: usize,
    /// Weak fields left alone because the child already had a value
    pub weak_skips: usize,
    /// Events hanging under a dangling parent, never reached
    pub detached: usize,
}

impl PropagationReport {
    /// True when the pass changed nothing
    pub fn is_fixed_point(&self) -> bool {
        self.writes == 0
    }
}

pub struct Propagator<'a> {
    registry: &'a FieldRegistry,
    options: PropagationOptions,
}

impl<'a> Propagator<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self::with_options(registry, PropagationOptions::default())
    }

    pub fn with_options(registry: &'a FieldRegistry, options: PropagationOptions) -> Self {
        Self { registry, options }
    }

    /// Runs one pass over a snapshot of the store's parent links.
    ///
    /// A cycle aborts the pass before anything is written.
    pub fn run<S: EventStore + ?Sized>(&self, store: &mut S) -> HierarchyResult<PropagationReport> {
        let tree = match EventTree::build(store.parent_links()?) {
            Ok(tree) => tree,
            Err(err) => {
                log_event_with_fields(
                    Event::PropagationCycle,
                    &[("details", err.details().unwrap_or(""))],
                );
                return Err(err);
            }
        };

        let fields: Vec<&FieldSpec> = self.registry.inheritable().collect();
        let events = tree.len().to_string();
        let field_count = fields.len().to_string();
        log_event_with_fields(
            Event::PropagationStart,
            &[("events", &events), ("fields", &field_count)],
        );

        let mut report = PropagationReport {
            detached: tree.detached().len(),
            ..PropagationReport::default()
        };

        for (parent, children) in tree.edges_from_roots() {
            report.parents += 1;
            report.children += children.len();

            for spec in &fields {
                let value = store.get_value(&parent, &spec.name)?;
                if value.is_blank() {
                    continue;
                }
                for child in &children {
                    let current = store.get_value(child, &spec.name)?;
                    if current == value {
                        continue;
                    }
                    if spec.inherit_weak && !current.is_blank() {
                        report.weak_skips += 1;
                        continue;
                    }
                    if store.set_value(child, &spec.name, value.clone())? {
                        report.writes += 1;
                    }
                }
            }

            if self.options.include_metadata {
                let metadata = store.get_metadata(&parent)?;
                if !metadata.is_empty() {
                    for child in &children {
                        if store.set_metadata(child, metadata.clone())? {
                            report.writes += 1;
                        }
                    }
                }
            }
        }

        log_event_with_fields(
            Event::PropagationComplete,
            &[
                ("children", &report.children.to_string()),
                ("detached", &report.detached.to_string()),
                ("weak_skips", &report.weak_skips.to_string()),
                ("writes", &report.writes.to_string()),
            ],
        );
        Ok(report)
    }
}
