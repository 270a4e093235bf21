//! JSON documents for saving and loading constructions.
//!
//! A document lists elements in construction order with their labels,
//! classes and parents (by label), together with the label allocator state
//! and the creation counter, so a loaded model keeps issuing labels and
//! creation indices where the saved one left off.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use straightedge_core::{element::Element, identifier::Label};

use crate::{
    error::ConstructionError,
    label::LabelAllocator,
    store::ElementStore,
};

/// Serialized form of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub name: String,
    pub labels: LabelAllocator,
    /// Creation index of the next element. Ahead of the last record when
    /// the newest elements were removed before saving.
    #[serde(default)]
    pub next_creation_index: u64,
    pub elements: Vec<ElementRecord>,
}

/// One stored element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub label: Label,
    pub creation_index: u64,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<Label>,
    pub element: Element,
}

impl ModelDocument {
    /// Captures a store.
    pub fn from_store(name: &str, store: &ElementStore) -> Result<Self, ConstructionError> {
        let elements = store
            .iter()
            .map(|(_, element, details)| {
                let parents = details
                    .parents()
                    .iter()
                    .map(|&parent| store.get(parent).map(|p| p.label()))
                    .collect::<Result<_, _>>()?;
                Ok(ElementRecord {
                    label: details.label(),
                    creation_index: details.creation_index(),
                    classes: details.classes().clone(),
                    parents,
                    element: element.clone(),
                })
            })
            .collect::<Result<_, ConstructionError>>()?;
        Ok(Self {
            name: name.to_string(),
            labels: store.allocator().clone(),
            next_creation_index: store.next_creation_index(),
            elements,
        })
    }

    /// Rebuilds the store. Elements are restored in creation order, and each
    /// parent must be restored before its children.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::Persist`] for dangling parents, repeated
    /// labels, elements or creation indices.
    pub fn into_store(self) -> Result<(String, ElementStore), ConstructionError> {
        let mut store = ElementStore::new(self.labels.pools());
        let mut records = self.elements;
        records.sort_by_key(|record| record.creation_index);

        for record in records {
            let parents = record
                .parents
                .iter()
                .map(|parent| {
                    store.by_label(&parent.to_string()).ok_or_else(|| {
                        ConstructionError::Persist(format!(
                            "{} lists {parent} as a parent before it exists",
                            record.label
                        ))
                    })
                })
                .collect::<Result<IndexSet<_>, _>>()?;
            store.restore(
                record.element,
                record.label,
                record.classes,
                parents,
                record.creation_index,
            )?;
        }
        store.set_allocator(self.labels);
        store.advance_creation_index(self.next_creation_index);
        debug!(name = self.name.as_str(), elements = store.len(); "Restored document");
        Ok((self.name, store))
    }

    pub fn to_json(&self) -> Result<String, ConstructionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConstructionError> {
        Ok(serde_json::from_str(json)?)
    }
}
