//! The ordered, deduplicating element store.
//!
//! Every element of a construction lives here exactly once. Insertion order
//! is the construction order: it drives label assignment, intersection
//! discovery and the sequencer.
//!
//! # Overview
//!
//! - [`ElementStore`] - The store itself
//! - [`ElementRef`] - A stable handle to a stored element
//! - [`ElementDetails`] - Label, classes, parents and creation index
//! - [`Inserted`] - The outcome of an insertion, new or deduplicated

use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use straightedge_core::{
    element::{Element, ElementKind},
    geometry::{Bounds, Point},
    identifier::Label,
};

use crate::{
    error::ConstructionError,
    label::{LabelAllocator, LabelPools},
};

static NEXT_STORE_ID: AtomicU32 = AtomicU32::new(0);

/// A stable handle to an element in one specific store.
///
/// Handles from one store are rejected by every other store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    store: u32,
    slot: u32,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.store, self.slot)
    }
}

/// Bookkeeping attached to each stored element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDetails {
    label: Label,
    classes: BTreeSet<String>,
    parents: IndexSet<ElementRef>,
    creation_index: u64,
}

impl ElementDetails {
    pub fn label(&self) -> Label {
        self.label
    }

    /// Free-form style tags such as `given`.
    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// The elements this one was constructed from, in construction order.
    pub fn parents(&self) -> &IndexSet<ElementRef> {
        &self.parents
    }

    /// Position in construction order. Never reused within a store.
    pub fn creation_index(&self) -> u64 {
        self.creation_index
    }
}

/// Outcome of [`ElementStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// The stored element; the pre-existing one when deduplicated.
    pub element: ElementRef,
    /// `false` when an exactly equal element was already stored.
    pub is_new: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    element: Element,
    details: ElementDetails,
}

/// Ordered collection of unique elements.
#[derive(Debug)]
pub struct ElementStore {
    id: u32,
    entries: IndexMap<ElementRef, Entry>,
    identities: HashMap<Element, ElementRef>,
    labels: HashMap<Label, ElementRef>,
    allocator: LabelAllocator,
    next_slot: u32,
    next_creation_index: u64,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new(LabelPools::default())
    }
}

impl ElementStore {
    pub fn new(pools: LabelPools) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            entries: IndexMap::new(),
            identities: HashMap::new(),
            labels: HashMap::new(),
            allocator: LabelAllocator::new(pools),
            next_slot: 0,
            next_creation_index: 0,
        }
    }

    /// Inserts an element unless an exactly equal one is already stored.
    ///
    /// A new element gets the next free label and the next creation index.
    /// A duplicate returns the existing handle; `parents` and `classes` are
    /// discarded and no label is consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::NotFound`] if a parent is not in this store.
    pub fn insert<S: Into<String>>(
        &mut self,
        element: Element,
        parents: impl IntoIterator<Item = ElementRef>,
        classes: impl IntoIterator<Item = S>,
    ) -> Result<Inserted, ConstructionError> {
        let parents = parents
            .into_iter()
            .map(|parent| self.check(parent).map(|()| parent))
            .collect::<Result<IndexSet<_>, _>>()?;

        if let Some(&existing) = self.identities.get(&element) {
            trace!(element:% = element; "Element already stored");
            return Ok(Inserted {
                element: existing,
                is_new: false,
            });
        }

        let label = self.allocate_label(element.kind());
        let details = ElementDetails {
            label,
            classes: classes.into_iter().map(Into::into).collect(),
            parents,
            creation_index: self.next_creation_index,
        };
        self.next_creation_index += 1;
        let element_ref = self.push(element, details);
        Ok(Inserted {
            element: element_ref,
            is_new: true,
        })
    }

    /// Stores an element with already-known bookkeeping, as read back from
    /// a saved construction. Creation indices must strictly increase from
    /// one call to the next.
    pub(crate) fn restore(
        &mut self,
        element: Element,
        label: Label,
        classes: BTreeSet<String>,
        parents: IndexSet<ElementRef>,
        creation_index: u64,
    ) -> Result<ElementRef, ConstructionError> {
        for &parent in &parents {
            self.check(parent)?;
        }
        if self.labels.contains_key(&label) {
            return Err(ConstructionError::Persist(format!(
                "label {label} is used twice"
            )));
        }
        if let Some(existing) = self.identities.get(&element) {
            return Err(ConstructionError::Persist(format!(
                "{label} duplicates {}",
                self.entries[existing].details.label
            )));
        }
        if creation_index < self.next_creation_index {
            return Err(ConstructionError::Persist(format!(
                "{label} has creation index {creation_index}, expected at least {}",
                self.next_creation_index
            )));
        }
        self.next_creation_index = creation_index.checked_add(1).ok_or_else(|| {
            ConstructionError::Persist(format!("{label} has creation index {creation_index}"))
        })?;
        let details = ElementDetails {
            label,
            classes,
            parents,
            creation_index,
        };
        Ok(self.push(element, details))
    }

    fn push(&mut self, element: Element, details: ElementDetails) -> ElementRef {
        let element_ref = ElementRef {
            store: self.id,
            slot: self.next_slot,
        };
        self.next_slot += 1;
        debug!(label:% = details.label, element:% = element; "Stored element");
        self.identities.insert(element.clone(), element_ref);
        self.labels.insert(details.label, element_ref);
        self.entries.insert(element_ref, Entry { element, details });
        element_ref
    }

    fn allocate_label(&mut self, kind: ElementKind) -> Label {
        loop {
            let label = self.allocator.next_label(kind);
            if !self.labels.contains_key(&label) {
                return label;
            }
        }
    }

    fn check(&self, element_ref: ElementRef) -> Result<(), ConstructionError> {
        if self.entries.contains_key(&element_ref) {
            Ok(())
        } else {
            Err(ConstructionError::NotFound(element_ref.to_string()))
        }
    }

    fn entry(&self, element_ref: ElementRef) -> Result<&Entry, ConstructionError> {
        self.entries
            .get(&element_ref)
            .ok_or_else(|| ConstructionError::NotFound(element_ref.to_string()))
    }

    /// Returns the bookkeeping of a stored element.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::NotFound`] for a foreign or removed handle.
    pub fn get(&self, element_ref: ElementRef) -> Result<&ElementDetails, ConstructionError> {
        self.entry(element_ref).map(|entry| &entry.details)
    }

    /// Returns the geometric element behind a handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::NotFound`] for a foreign or removed handle.
    pub fn element(&self, element_ref: ElementRef) -> Result<&Element, ConstructionError> {
        self.entry(element_ref).map(|entry| &entry.element)
    }

    pub fn contains(&self, element_ref: ElementRef) -> bool {
        self.entries.contains_key(&element_ref)
    }

    /// Looks up an element by label.
    pub fn by_label(&self, label: &str) -> Option<ElementRef> {
        self.labels.get(&Label::new(label)).copied()
    }

    /// Looks up an exactly equal element.
    pub fn find(&self, element: &Element) -> Option<ElementRef> {
        self.identities.get(element).copied()
    }

    /// Elements that list `element_ref` as a parent, in construction order.
    pub fn dependents(&self, element_ref: ElementRef) -> Vec<ElementRef> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.details.parents.contains(&element_ref))
            .map(|(&child, _)| child)
            .collect()
    }

    /// Every element `element_ref` was transitively constructed from,
    /// excluding itself, in construction order.
    ///
    /// Follows parent links from `element_ref` only, so the cost depends on
    /// the size of its lineage rather than of the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::NotFound`] for a foreign or removed handle.
    pub fn ancestors(
        &self,
        element_ref: ElementRef,
    ) -> Result<IndexSet<ElementRef>, ConstructionError> {
        let mut visited = HashSet::from([element_ref]);
        let mut queue = VecDeque::from([element_ref]);
        let mut found = Vec::new();
        while let Some(current) = queue.pop_front() {
            for &parent in self.get(current)?.parents() {
                if visited.insert(parent) {
                    found.push((self.get(parent)?.creation_index, parent));
                    queue.push_back(parent);
                }
            }
        }
        found.sort_unstable();
        Ok(found.into_iter().map(|(_, ancestor)| ancestor).collect())
    }

    /// Removes the element with the given label.
    ///
    /// Its label is retired: the allocator has already moved past it and
    /// will not issue it again.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::UnknownLabel`] if no element has the label.
    /// - [`ConstructionError::DependentsExist`] if other elements were
    ///   constructed from it.
    pub fn remove_by_label(&mut self, label: &str) -> Result<Element, ConstructionError> {
        let element_ref = self
            .by_label(label)
            .ok_or_else(|| ConstructionError::UnknownLabel(label.to_string()))?;

        let dependents = self.dependents(element_ref);
        if !dependents.is_empty() {
            let dependents = dependents
                .into_iter()
                .filter_map(|child| self.entries.get(&child))
                .map(|entry| entry.details.label.to_string())
                .collect();
            return Err(ConstructionError::DependentsExist {
                label: label.to_string(),
                dependents,
            });
        }

        let entry = self
            .entries
            .shift_remove(&element_ref)
            .ok_or_else(|| ConstructionError::NotFound(element_ref.to_string()))?;
        self.identities.remove(&entry.element);
        self.labels.remove(&entry.details.label);
        debug!(label; "Removed element");
        Ok(entry.element)
    }

    /// Adds a class tag. Returns `false` if the element already had it.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::NotFound`] for a foreign or removed handle.
    pub fn add_class(
        &mut self,
        element_ref: ElementRef,
        class: impl Into<String>,
    ) -> Result<bool, ConstructionError> {
        let entry = self
            .entries
            .get_mut(&element_ref)
            .ok_or_else(|| ConstructionError::NotFound(element_ref.to_string()))?;
        Ok(entry.details.classes.insert(class.into()))
    }

    /// Iterates over all elements in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementRef, &Element, &ElementDetails)> {
        self.entries
            .iter()
            .map(|(&element_ref, entry)| (element_ref, &entry.element, &entry.details))
    }

    /// Handles of all elements in construction order.
    pub fn refs(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.entries.keys().copied()
    }

    /// All points in construction order.
    pub fn points(&self) -> impl Iterator<Item = (ElementRef, &Point)> {
        self.entries.iter().filter_map(|(&element_ref, entry)| {
            entry.element.as_point().map(|point| (element_ref, point))
        })
    }

    /// Handles grouped by element kind, kinds and members in construction order.
    pub fn group_by_kind(&self) -> IndexMap<ElementKind, Vec<ElementRef>> {
        let mut groups: IndexMap<ElementKind, Vec<ElementRef>> = IndexMap::new();
        for (element_ref, element, _) in self.iter() {
            groups.entry(element.kind()).or_default().push(element_ref);
        }
        groups
    }

    /// Approximate extent of all points, or `None` without points.
    pub fn limits(&self) -> Option<Bounds> {
        Bounds::from_points(self.points().map(|(_, point)| point))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allocator(&self) -> &LabelAllocator {
        &self.allocator
    }

    pub(crate) fn set_allocator(&mut self, allocator: LabelAllocator) {
        self.allocator = allocator;
    }

    /// The creation index the next inserted element will get.
    pub fn next_creation_index(&self) -> u64 {
        self.next_creation_index
    }

    /// Moves the creation counter forward to `next`. Never moves it back.
    pub(crate) fn advance_creation_index(&mut self, next: u64) {
        self.next_creation_index = self.next_creation_index.max(next);
    }
}

#[cfg(test)]
mod tests {
    use straightedge_core::geometry::Line;

    use super::*;

    const NONE: [&str; 0] = [];

    fn point(x: i64, y: i64) -> Element {
        Element::Point(Point::new(x, y))
    }

    #[test]
    fn test_insert_assigns_labels_in_order() {
        let mut store = ElementStore::default();
        let a = store.insert(point(0, 0), [], ["given"]).unwrap();
        let b = store.insert(point(1, 0), [], ["given"]).unwrap();
        assert!(a.is_new && b.is_new);
        assert_eq!(store.get(a.element).unwrap().label(), "A");
        assert_eq!(store.get(b.element).unwrap().label(), "B");
        assert!(store.get(a.element).unwrap().has_class("given"));
        assert_eq!(store.get(b.element).unwrap().creation_index(), 1);
    }

    #[test]
    fn test_duplicate_returns_existing_without_consuming_label() {
        let mut store = ElementStore::default();
        let first = store.insert(point(0, 0), [], ["given"]).unwrap();
        let again = store.insert(point(0, 0), [], NONE).unwrap();
        assert_eq!(again.element, first.element);
        assert!(!again.is_new);
        assert_eq!(store.len(), 1);

        let next = store.insert(point(2, 0), [], NONE).unwrap();
        assert_eq!(store.get(next.element).unwrap().label(), "B");
    }

    #[test]
    fn test_foreign_parent_is_rejected() {
        let mut other = ElementStore::default();
        let foreign = other.insert(point(0, 0), [], NONE).unwrap().element;

        let mut store = ElementStore::default();
        let result = store.insert(point(1, 1), [foreign], NONE);
        assert!(matches!(result, Err(ConstructionError::NotFound(_))));
        assert!(store.is_empty());
        assert!(matches!(store.get(foreign), Err(ConstructionError::NotFound(_))));
    }

    #[test]
    fn test_remove_respects_dependents() {
        let mut store = ElementStore::default();
        let a = store.insert(point(0, 0), [], NONE).unwrap().element;
        let b = store.insert(point(1, 0), [], NONE).unwrap().element;
        let line = Line::through(&Point::new(0, 0), &Point::new(1, 0)).unwrap();
        store.insert(Element::Line(line), [a, b], NONE).unwrap();

        match store.remove_by_label("A") {
            Err(ConstructionError::DependentsExist { dependents, .. }) => {
                assert_eq!(dependents, ["a"]);
            }
            other => panic!("expected DependentsExist, got {other:?}"),
        }

        store.remove_by_label("a").unwrap();
        store.remove_by_label("A").unwrap();
        assert!(store.by_label("A").is_none());
        assert!(matches!(
            store.remove_by_label("A"),
            Err(ConstructionError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_removed_label_is_not_reissued() {
        let mut store = ElementStore::default();
        store.insert(point(0, 0), [], NONE).unwrap();
        store.remove_by_label("A").unwrap();
        let next = store.insert(point(0, 0), [], NONE).unwrap();
        assert!(next.is_new);
        assert_eq!(store.get(next.element).unwrap().label(), "B");
        assert_eq!(store.get(next.element).unwrap().creation_index(), 1);
    }

    #[test]
    fn test_restore_rejects_repeated_or_overflowing_index() {
        let mut store = ElementStore::default();
        let restore = |store: &mut ElementStore, x: i64, label: &str, index: u64| {
            store.restore(point(x, 0), Label::new(label), BTreeSet::new(), IndexSet::new(), index)
        };
        restore(&mut store, 0, "A", 3).unwrap();
        assert_eq!(store.next_creation_index(), 4);
        assert!(matches!(
            restore(&mut store, 1, "B", 3),
            Err(ConstructionError::Persist(_))
        ));
        assert!(matches!(
            restore(&mut store, 2, "C", u64::MAX),
            Err(ConstructionError::Persist(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ancestors_follow_parent_links() {
        let mut store = ElementStore::default();
        let a = store.insert(point(0, 0), [], NONE).unwrap().element;
        let b = store.insert(point(1, 0), [], NONE).unwrap().element;
        let line = Line::through(&Point::new(0, 0), &Point::new(1, 0)).unwrap();
        let l = store.insert(Element::Line(line), [b, a], NONE).unwrap().element;
        let c = store.insert(point(4, 0), [l, a], NONE).unwrap().element;
        store.insert(point(9, 9), [], NONE).unwrap();

        let ancestors: Vec<_> = store.ancestors(c).unwrap().into_iter().collect();
        assert_eq!(ancestors, [a, b, l]);
        assert!(store.ancestors(a).unwrap().is_empty());
    }

    #[test]
    fn test_queries() {
        let mut store = ElementStore::default();
        let a = store.insert(point(-1, 2), [], NONE).unwrap().element;
        let b = store.insert(point(3, 0), [], NONE).unwrap().element;
        let line = Line::through(&Point::new(-1, 2), &Point::new(3, 0)).unwrap();
        let l = store.insert(Element::Line(line), [a, b], NONE).unwrap().element;

        assert_eq!(store.points().count(), 2);
        assert_eq!(store.dependents(a), [l]);
        let groups = store.group_by_kind();
        assert_eq!(groups[&ElementKind::Point], [a, b]);
        assert_eq!(groups[&ElementKind::Line], [l]);

        let limits = store.limits().unwrap();
        assert_eq!((limits.min_x(), limits.max_x()), (-1.0, 3.0));
        assert_eq!((limits.min_y(), limits.max_y()), (0.0, 2.0));

        assert!(store.add_class(l, "guide").unwrap());
        assert!(!store.add_class(l, "guide").unwrap());
    }
}
