//! Parent-child relations between constructed elements.
//!
//! Every element records the elements it was constructed from. This module
//! lifts those records into a directed graph, with edges running from parent
//! to child, and answers lineage questions over it.
//!
//! The graph is a read-only view built on demand from an
//! [`ElementStore`]. Building is linear in the size of the store; each
//! traversal touches only the reachable part.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::trace;
use petgraph::{
    Direction,
    algo::is_cyclic_directed,
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, Reversed, Walker},
};

use straightedge_core::{geometry::Bounds, identifier::Label};

use crate::{
    error::ConstructionError,
    store::{ElementRef, ElementStore},
};

/// Lineage view over an [`ElementStore`].
#[derive(Debug)]
pub struct ConstructionGraph<'a> {
    store: &'a ElementStore,
    graph: DiGraph<ElementRef, ()>,
    nodes: HashMap<ElementRef, NodeIndex>,
}

impl<'a> ConstructionGraph<'a> {
    /// Builds the graph of every element in the store.
    pub fn new(store: &'a ElementStore) -> Self {
        let mut graph = DiGraph::with_capacity(store.len(), store.len() * 2);
        let nodes: HashMap<_, _> = store
            .refs()
            .map(|element_ref| (element_ref, graph.add_node(element_ref)))
            .collect();

        for (child, _, details) in store.iter() {
            for parent in details.parents() {
                if let (Some(&from), Some(&to)) = (nodes.get(parent), nodes.get(&child)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        trace!(nodes = graph.node_count(), edges = graph.edge_count(); "Built construction graph");

        Self {
            store,
            graph,
            nodes,
        }
    }

    fn node(&self, element_ref: ElementRef) -> Result<NodeIndex, ConstructionError> {
        self.nodes
            .get(&element_ref)
            .copied()
            .ok_or_else(|| ConstructionError::NotFound(element_ref.to_string()))
    }

    /// Sorts handles into construction order.
    fn in_creation_order(&self, refs: impl IntoIterator<Item = ElementRef>) -> IndexSet<ElementRef> {
        let mut refs: Vec<_> = refs.into_iter().collect();
        refs.sort_by_key(|&r| self.store.get(r).map_or(u64::MAX, |d| d.creation_index()));
        refs.into_iter().collect()
    }

    /// Direct parents, in the order they were given at construction.
    pub fn parents(&self, element_ref: ElementRef) -> Result<Vec<ElementRef>, ConstructionError> {
        Ok(self.store.get(element_ref)?.parents().iter().copied().collect())
    }

    /// Direct children, in construction order.
    pub fn children(&self, element_ref: ElementRef) -> Result<Vec<ElementRef>, ConstructionError> {
        let node = self.node(element_ref)?;
        let children = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|child| self.graph[child]);
        Ok(self.in_creation_order(children).into_iter().collect())
    }

    /// Every element `element_ref` was transitively constructed from,
    /// excluding itself, in construction order.
    pub fn ancestors(
        &self,
        element_ref: ElementRef,
    ) -> Result<IndexSet<ElementRef>, ConstructionError> {
        let start = self.node(element_ref)?;
        let reversed = Reversed(&self.graph);
        let found = Bfs::new(reversed, start)
            .iter(reversed)
            .filter(|&node| node != start)
            .map(|node| self.graph[node]);
        Ok(self.in_creation_order(found))
    }

    /// Labels of [`Self::ancestors`].
    pub fn ancestor_labels(&self, element_ref: ElementRef) -> Result<Vec<Label>, ConstructionError> {
        self.ancestors(element_ref)?
            .into_iter()
            .map(|ancestor| self.store.get(ancestor).map(|details| details.label()))
            .collect()
    }

    /// Every element transitively constructed from `element_ref`, excluding
    /// itself, in construction order.
    pub fn descendants(
        &self,
        element_ref: ElementRef,
    ) -> Result<IndexSet<ElementRef>, ConstructionError> {
        let start = self.node(element_ref)?;
        let found = Bfs::new(&self.graph, start)
            .iter(&self.graph)
            .filter(|&node| node != start)
            .map(|node| self.graph[node]);
        Ok(self.in_creation_order(found))
    }

    /// Elements without parents, such as given points, in construction order.
    pub fn roots(&self) -> Vec<ElementRef> {
        let roots = self
            .graph
            .externals(Direction::Incoming)
            .map(|node| self.graph[node]);
        self.in_creation_order(roots).into_iter().collect()
    }

    /// Always `true` for graphs built from a store, since parents must exist
    /// before their children.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Every element in construction order, which puts each parent before
    /// its children. `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<ElementRef>> {
        if !self.is_acyclic() {
            return None;
        }
        let nodes = self.graph.node_indices().map(|node| self.graph[node]);
        Some(self.in_creation_order(nodes).into_iter().collect())
    }

    /// Approximate extent of an element together with everything it was
    /// constructed from.
    ///
    /// Returns `None` only for elements with no anchor points anywhere in
    /// their lineage.
    pub fn zoom_bounds(&self, element_ref: ElementRef) -> Result<Option<Bounds>, ConstructionError> {
        let mut lineage = self.ancestors(element_ref)?;
        lineage.insert(element_ref);
        let mut bounds: Option<Bounds> = None;
        for member in lineage {
            if let Some(extent) = self.store.element(member)?.bounds() {
                bounds = Some(bounds.map_or(extent, |b| b.merge(extent)));
            }
        }
        Ok(bounds)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use straightedge_core::{
        element::Element,
        geometry::{Line, Point},
    };

    use super::*;

    const NONE: [&str; 0] = [];

    struct Fixture {
        store: ElementStore,
        a: ElementRef,
        b: ElementRef,
        c: ElementRef,
        line: ElementRef,
        far: ElementRef,
    }

    fn fixture() -> Fixture {
        let mut store = ElementStore::default();
        let pa = Point::new(0, 0);
        let pb = Point::new(2, 0);
        let a = store.insert(Element::Point(pa.clone()), [], NONE).unwrap().element;
        let b = store.insert(Element::Point(pb.clone()), [], NONE).unwrap().element;
        let line = store
            .insert(Element::Line(Line::through(&pa, &pb).unwrap()), [a, b], NONE)
            .unwrap()
            .element;
        let c = store.insert(Element::Point(Point::new(1, 0)), [line], NONE).unwrap().element;
        let far = store.insert(Element::Point(Point::new(9, 9)), [], NONE).unwrap().element;
        Fixture {
            store,
            a,
            b,
            c,
            line,
            far,
        }
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let f = fixture();
        let graph = ConstructionGraph::new(&f.store);

        let ancestors: Vec<_> = graph.ancestors(f.c).unwrap().into_iter().collect();
        assert_eq!(ancestors, [f.a, f.b, f.line]);
        assert_eq!(graph.ancestor_labels(f.c).unwrap(), ["A", "B", "a"]);
        assert!(graph.ancestors(f.a).unwrap().is_empty());

        let descendants: Vec<_> = graph.descendants(f.a).unwrap().into_iter().collect();
        assert_eq!(descendants, [f.line, f.c]);
    }

    #[test]
    fn test_parents_children_roots() {
        let f = fixture();
        let graph = ConstructionGraph::new(&f.store);

        assert_eq!(graph.parents(f.line).unwrap(), [f.a, f.b]);
        assert_eq!(graph.children(f.line).unwrap(), [f.c]);
        assert_eq!(graph.roots(), [f.a, f.b, f.far]);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_order_and_acyclicity() {
        let f = fixture();
        let graph = ConstructionGraph::new(&f.store);
        assert!(graph.is_acyclic());

        let order = graph.topological_order().unwrap();
        assert_eq!(order, [f.a, f.b, f.line, f.c, f.far]);
    }

    #[test]
    fn test_order_follows_creation_not_depth() {
        let mut store = ElementStore::default();
        let pa = Point::new(0, 0);
        let pb = Point::new(1, 0);
        let a = store.insert(Element::Point(pa.clone()), [], NONE).unwrap().element;
        let b = store.insert(Element::Point(pb.clone()), [], NONE).unwrap().element;
        let line = store
            .insert(Element::Line(Line::through(&pa, &pb).unwrap()), [a, b], NONE)
            .unwrap()
            .element;
        let lone = store.insert(Element::Point(Point::new(0, 5)), [], NONE).unwrap().element;
        let c = store.insert(Element::Point(Point::new(3, 0)), [line, a], NONE).unwrap().element;

        let graph = ConstructionGraph::new(&store);
        let labels: Vec<_> = graph
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|r| store.get(r).unwrap().label().to_string())
            .collect();
        assert_eq!(labels, ["A", "B", "a", "C", "D"]);
        assert_eq!(graph.topological_order().unwrap(), [a, b, line, lone, c]);
    }

    #[test]
    fn test_zoom_bounds_cover_lineage() {
        let f = fixture();
        let graph = ConstructionGraph::new(&f.store);

        let bounds = graph.zoom_bounds(f.c).unwrap().unwrap();
        assert_eq!((bounds.min_x(), bounds.max_x()), (0.0, 2.0));

        let lone = graph.zoom_bounds(f.far).unwrap().unwrap();
        assert_eq!(lone.width(), 0.0);
    }

    #[test]
    fn test_unknown_handle() {
        let f = fixture();
        let other = fixture();
        let graph = ConstructionGraph::new(&f.store);
        assert!(matches!(
            graph.ancestors(other.a),
            Err(ConstructionError::NotFound(_))
        ));
    }
}
