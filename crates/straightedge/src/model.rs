//! The construction model: given points, constructed lines and circles, and
//! the points where they meet.
//!
//! Adding a line or circle intersects it with every line and circle already
//! in the model, in construction order, and stores each intersection point
//! with the two structures as parents. Points that already exist are not
//! duplicated; their first discovery keeps its label and parents.

use std::path::Path;

use indexmap::IndexSet;
use log::{debug, info};

use straightedge_core::{
    element::{Element, ElementKind},
    engine::{ExactEngine, GeometryEngine},
    geometry::{Bounds, GeometryError, Point, Polygon, Segment, Wedge},
    identifier::Label,
    number::Surd,
};

use crate::{
    config::AppConfig,
    error::ConstructionError,
    graph::ConstructionGraph,
    label::LabelPools,
    persist::ModelDocument,
    sequencer::Sequencer,
    store::{ElementRef, ElementStore, Inserted},
};

const NO_CLASSES: [&str; 0] = [];

/// Outcome of constructing a line or circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructed {
    /// The line or circle itself.
    pub structure: Inserted,
    /// Intersection points, in discovery order. Empty when the structure
    /// already existed.
    pub points: Vec<Inserted>,
}

impl Constructed {
    /// Intersection points that were not in the model before.
    pub fn new_points(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.points
            .iter()
            .filter(|inserted| inserted.is_new)
            .map(|inserted| inserted.element)
    }
}

/// A named compass-and-straightedge construction.
///
/// # Examples
///
/// ```
/// use straightedge::Model;
///
/// let mut model = Model::new("vesica");
/// let a = model.set_point(0, 0, &["given"]).unwrap().element;
/// let b = model.set_point(1, 0, &["given"]).unwrap().element;
/// model.construct_circle(a, b).unwrap();
/// let second = model.construct_circle(b, a).unwrap();
/// assert_eq!(second.new_points().count(), 2);
/// ```
#[derive(Debug)]
pub struct Model<E: GeometryEngine = ExactEngine> {
    name: String,
    store: ElementStore,
    engine: E,
}

impl Model<ExactEngine> {
    /// Creates an empty model with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &AppConfig::default())
    }

    /// Creates an empty model with the given settings.
    pub fn with_config(name: impl Into<String>, config: &AppConfig) -> Self {
        Self::with_engine(name, config.engine().build(), config.labels().pools())
    }

    /// Loads a model saved with [`Model::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConstructionError> {
        Self::load_with_engine(path, ExactEngine::default())
    }

    /// Parses a model from JSON produced by [`Model::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::Persist`] for malformed documents.
    pub fn from_json(json: &str) -> Result<Self, ConstructionError> {
        Self::from_document(ModelDocument::from_json(json)?, ExactEngine::default())
    }
}

impl<E: GeometryEngine> Model<E> {
    /// Creates an empty model on a custom engine.
    pub fn with_engine(name: impl Into<String>, engine: E, pools: LabelPools) -> Self {
        Self {
            name: name.into(),
            store: ElementStore::new(pools),
            engine,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Adds a point at exact coordinates.
    ///
    /// An existing equal point is returned as is; `classes` are then ignored.
    pub fn set_point(
        &mut self,
        x: impl Into<Surd>,
        y: impl Into<Surd>,
        classes: &[&str],
    ) -> Result<Inserted, ConstructionError> {
        let point = Point::new(x, y);
        let inserted = self.store.insert(Element::Point(point), [], classes.iter().copied())?;
        if inserted.is_new {
            info!(label:% = self.label(inserted.element)?; "Set point");
        }
        Ok(inserted)
    }

    /// Adds the line through two points and its intersections.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::KindMismatch`] if either handle is not a point.
    /// - [`ConstructionError::GeometryUndefined`] if the points coincide or
    ///   an intersection cannot be computed.
    pub fn construct_line(
        &mut self,
        a: ElementRef,
        b: ElementRef,
    ) -> Result<Constructed, ConstructionError> {
        let line = self.engine.line_through(self.point(a)?, self.point(b)?)?;
        self.construct_structure(Element::Line(line), [a, b])
    }

    /// Adds the circle around `center` through `through` and its intersections.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::KindMismatch`] if either handle is not a point.
    /// - [`ConstructionError::GeometryUndefined`] if the points coincide or
    ///   an intersection cannot be computed.
    pub fn construct_circle(
        &mut self,
        center: ElementRef,
        through: ElementRef,
    ) -> Result<Constructed, ConstructionError> {
        let circle = self.engine.circle(self.point(center)?, self.point(through)?)?;
        self.construct_structure(Element::Circle(circle), [center, through])
    }

    /// Constructs the perpendicular bisector of two points with two circles
    /// and the line through their crossings.
    ///
    /// Returns the outcome for the bisecting line.
    pub fn construct_perpendicular_bisector(
        &mut self,
        a: ElementRef,
        b: ElementRef,
    ) -> Result<Constructed, ConstructionError> {
        let first = self.construct_circle(a, b)?.structure.element;
        let second = self.construct_circle(b, a)?.structure.element;
        let crossings = self
            .engine
            .intersect(self.store.element(first)?, self.store.element(second)?)?;
        let [p, q] = <[Point; 2]>::try_from(crossings).map_err(|found| {
            GeometryError::MissingIntersection {
                expected: 2,
                found: found.len(),
            }
        })?;
        let p = self.store.insert(Element::Point(p), [first, second], NO_CLASSES)?;
        let q = self.store.insert(Element::Point(q), [first, second], NO_CLASSES)?;
        self.construct_line(p.element, q.element)
    }

    fn construct_structure(
        &mut self,
        structure: Element,
        parents: [ElementRef; 2],
    ) -> Result<Constructed, ConstructionError> {
        if let Some(existing) = self.store.find(&structure) {
            debug!(label:% = self.label(existing)?; "Structure already constructed");
            return Ok(Constructed {
                structure: Inserted {
                    element: existing,
                    is_new: false,
                },
                points: Vec::new(),
            });
        }

        // a failing intersection must leave the model untouched
        let mut discovered = Vec::new();
        for (other, element, _) in self.store.iter() {
            if element.kind().is_curve() {
                for point in self.engine.intersect(&structure, element)? {
                    discovered.push((point, other));
                }
            }
        }

        let kind = structure.kind();
        let inserted = self.store.insert(structure, parents, NO_CLASSES)?;
        let mut points = Vec::with_capacity(discovered.len());
        for (point, other) in discovered {
            points.push(self.store.insert(
                Element::Point(point),
                [inserted.element, other],
                NO_CLASSES,
            )?);
        }
        info!(
            label:% = self.label(inserted.element)?,
            kind:% = kind,
            new_points = points.iter().filter(|p| p.is_new).count();
            "Constructed"
        );
        Ok(Constructed {
            structure: inserted,
            points,
        })
    }

    /// Adds a segment between two points.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::InvalidArity`] unless exactly two points are given.
    /// - [`ConstructionError::KindMismatch`] if a handle is not a point.
    pub fn set_segment(&mut self, endpoints: &[ElementRef]) -> Result<Inserted, ConstructionError> {
        let [p, q] = self.points_exact::<2>(ElementKind::Segment, endpoints)?;
        let segment = Segment::new(p, q)?;
        self.insert_figure(Element::Segment(segment), endpoints)
    }

    /// Adds a polygon through at least three points.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::InvalidArity`] with fewer than three distinct points.
    /// - [`ConstructionError::KindMismatch`] if a handle is not a point.
    /// - [`ConstructionError::GeometryUndefined`] if a vertex repeats.
    pub fn set_polygon(&mut self, vertices: &[ElementRef]) -> Result<Inserted, ConstructionError> {
        // equal points share a handle, so distinct handles are distinct points
        let distinct = vertices.iter().collect::<IndexSet<_>>().len();
        if distinct < 3 {
            return Err(ConstructionError::InvalidArity {
                kind: ElementKind::Polygon,
                expected: "at least 3 distinct".to_string(),
                found: distinct,
            });
        }
        let points = vertices
            .iter()
            .map(|&vertex| self.point(vertex).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let polygon = Polygon::new(points)?;
        self.insert_figure(Element::Polygon(polygon), vertices)
    }

    /// Adds a wedge from `[center, radius_point, start, end]`.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::InvalidArity`] unless exactly four points are given.
    /// - [`ConstructionError::KindMismatch`] if a handle is not a point.
    pub fn set_wedge(&mut self, points: &[ElementRef]) -> Result<Inserted, ConstructionError> {
        let [center, radius_point, start, end] = self.points_exact::<4>(ElementKind::Wedge, points)?;
        let wedge = Wedge::new(center, radius_point, start, end)?;
        self.insert_figure(Element::Wedge(wedge), points)
    }

    fn insert_figure(
        &mut self,
        figure: Element,
        parents: &[ElementRef],
    ) -> Result<Inserted, ConstructionError> {
        let kind = figure.kind();
        let inserted = self.store.insert(figure, parents.iter().copied(), NO_CLASSES)?;
        if inserted.is_new {
            info!(label:% = self.label(inserted.element)?, kind:% = kind; "Set figure");
        }
        Ok(inserted)
    }

    /// Resolves a handle that must be a point.
    fn point(&self, element_ref: ElementRef) -> Result<&Point, ConstructionError> {
        let element = self.store.element(element_ref)?;
        element.as_point().ok_or_else(|| ConstructionError::KindMismatch {
            label: self.store.get(element_ref).map(|d| d.label().to_string()).unwrap_or_default(),
            expected: ElementKind::Point,
            found: element.kind(),
        })
    }

    fn points_exact<const N: usize>(
        &self,
        kind: ElementKind,
        refs: &[ElementRef],
    ) -> Result<[Point; N], ConstructionError> {
        let arity_error = |found| ConstructionError::InvalidArity {
            kind,
            expected: format!("exactly {N}"),
            found,
        };
        if refs.len() != N {
            return Err(arity_error(refs.len()));
        }
        let points = refs
            .iter()
            .map(|&element_ref| self.point(element_ref).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        <[Point; N]>::try_from(points).map_err(|points| arity_error(points.len()))
    }

    fn label(&self, element_ref: ElementRef) -> Result<Label, ConstructionError> {
        self.store.get(element_ref).map(|details| details.label())
    }

    /// Looks up an element by label.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::UnknownLabel`] if no element has the label.
    pub fn element_by_label(&self, label: &str) -> Result<ElementRef, ConstructionError> {
        self.store
            .by_label(label)
            .ok_or_else(|| ConstructionError::UnknownLabel(label.to_string()))
    }

    fn refs_by_labels(&self, labels: &[&str]) -> Result<Vec<ElementRef>, ConstructionError> {
        labels.iter().map(|label| self.element_by_label(label)).collect()
    }

    fn pair_by_labels(&self, labels: &[&str], kind: ElementKind) -> Result<[ElementRef; 2], ConstructionError> {
        let refs = self.refs_by_labels(labels)?;
        <[ElementRef; 2]>::try_from(refs).map_err(|refs| ConstructionError::InvalidArity {
            kind,
            expected: "exactly 2".to_string(),
            found: refs.len(),
        })
    }

    /// [`Self::construct_line`] addressed by labels.
    pub fn construct_line_by_labels(&mut self, labels: &[&str]) -> Result<Constructed, ConstructionError> {
        let [a, b] = self.pair_by_labels(labels, ElementKind::Line)?;
        self.construct_line(a, b)
    }

    /// [`Self::construct_circle`] addressed by labels: `[center, through]`.
    pub fn construct_circle_by_labels(&mut self, labels: &[&str]) -> Result<Constructed, ConstructionError> {
        let [center, through] = self.pair_by_labels(labels, ElementKind::Circle)?;
        self.construct_circle(center, through)
    }

    /// [`Self::set_segment`] addressed by labels.
    pub fn set_segment_by_labels(&mut self, labels: &[&str]) -> Result<Inserted, ConstructionError> {
        let refs = self.refs_by_labels(labels)?;
        self.set_segment(&refs)
    }

    /// [`Self::set_polygon`] addressed by labels.
    pub fn set_polygon_by_labels(&mut self, labels: &[&str]) -> Result<Inserted, ConstructionError> {
        let refs = self.refs_by_labels(labels)?;
        self.set_polygon(&refs)
    }

    /// [`Self::set_wedge`] addressed by labels.
    pub fn set_wedge_by_labels(&mut self, labels: &[&str]) -> Result<Inserted, ConstructionError> {
        let refs = self.refs_by_labels(labels)?;
        self.set_wedge(&refs)
    }

    /// Removes an element nothing else was constructed from.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::UnknownLabel`] if no element has the label.
    /// - [`ConstructionError::DependentsExist`] if other elements depend on it.
    pub fn remove_by_label(&mut self, label: &str) -> Result<Element, ConstructionError> {
        let removed = self.store.remove_by_label(label)?;
        info!(label; "Removed element");
        Ok(removed)
    }

    /// Tags an element with a class. Returns `false` if it already had it.
    pub fn add_class(&mut self, element_ref: ElementRef, class: &str) -> Result<bool, ConstructionError> {
        self.store.add_class(element_ref, class)
    }

    /// A lineage view over the current elements.
    pub fn graph(&self) -> ConstructionGraph<'_> {
        ConstructionGraph::new(&self.store)
    }

    /// Every element `element_ref` was transitively constructed from.
    pub fn ancestors(&self, element_ref: ElementRef) -> Result<IndexSet<ElementRef>, ConstructionError> {
        self.store.ancestors(element_ref)
    }

    /// Labels of [`Self::ancestors`], in construction order.
    pub fn ancestor_labels(&self, element_ref: ElementRef) -> Result<Vec<Label>, ConstructionError> {
        self.ancestors(element_ref)?
            .into_iter()
            .map(|ancestor| self.label(ancestor))
            .collect()
    }

    /// Handles of all points in construction order.
    pub fn points(&self) -> Vec<ElementRef> {
        self.store.points().map(|(element_ref, _)| element_ref).collect()
    }

    /// Approximate extent of all points.
    pub fn limits(&self) -> Option<Bounds> {
        self.store.limits()
    }

    /// A sequencer over the elements as they are now.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptySequence`] for an empty model.
    pub fn sequencer(&self) -> Result<Sequencer, ConstructionError> {
        Sequencer::attach(&self.store)
    }

    /// Serializes the model to a JSON document.
    pub fn to_json(&self) -> Result<String, ConstructionError> {
        ModelDocument::from_store(&self.name, &self.store)?.to_json()
    }

    /// Writes the model to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConstructionError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = path.display().to_string(), elements = self.store.len(); "Saved model");
        Ok(())
    }

    /// Loads a model saved with [`Model::save`] onto a custom engine.
    pub fn load_with_engine(path: impl AsRef<Path>, engine: E) -> Result<Self, ConstructionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let model = Self::from_document(ModelDocument::from_json(&json)?, engine)?;
        info!(path = path.display().to_string(), elements = model.store.len(); "Loaded model");
        Ok(model)
    }

    fn from_document(document: ModelDocument, engine: E) -> Result<Self, ConstructionError> {
        let (name, store) = document.into_store()?;
        Ok(Self {
            name,
            store,
            engine,
        })
    }
}
