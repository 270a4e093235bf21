//! The closed set of elements a construction can hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Circle, Line, Point, Polygon, Segment, Wedge};

/// A geometric element stored in a construction.
///
/// Identity is exact: two elements are the same element exactly when their
/// canonical primitives are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Segment(Segment),
    Polygon(Polygon),
    Wedge(Wedge),
}

/// Discriminant of [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Point,
    Line,
    Circle,
    Segment,
    Polygon,
    Wedge,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Point,
        ElementKind::Line,
        ElementKind::Circle,
        ElementKind::Segment,
        ElementKind::Polygon,
        ElementKind::Wedge,
    ];

    /// Lines and circles; the only kinds that take part in intersections.
    pub fn is_curve(self) -> bool {
        matches!(self, ElementKind::Line | ElementKind::Circle)
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Point => "point",
            ElementKind::Line => "line",
            ElementKind::Circle => "circle",
            ElementKind::Segment => "segment",
            ElementKind::Polygon => "polygon",
            ElementKind::Wedge => "wedge",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Point(_) => ElementKind::Point,
            Element::Line(_) => ElementKind::Line,
            Element::Circle(_) => ElementKind::Circle,
            Element::Segment(_) => ElementKind::Segment,
            Element::Polygon(_) => ElementKind::Polygon,
            Element::Wedge(_) => ElementKind::Wedge,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Element::Point(point) => Some(point),
            _ => None,
        }
    }

    /// The points that pin this element down in the plane.
    ///
    /// Lines carry no points of their own; their extent comes from the
    /// points they were constructed through.
    pub fn anchor_points(&self) -> Vec<&Point> {
        match self {
            Element::Point(point) => vec![point],
            Element::Line(_) => Vec::new(),
            Element::Circle(circle) => vec![circle.center()],
            Element::Segment(segment) => segment.endpoints().iter().collect(),
            Element::Polygon(polygon) => polygon.vertices().iter().collect(),
            Element::Wedge(wedge) => vec![wedge.center(), wedge.radius_point(), wedge.start(), wedge.end()],
        }
    }

    /// Approximate extent, or `None` for unbounded lines.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Element::Line(_) => None,
            Element::Circle(circle) => Some(Bounds::from_circle(circle)),
            other => Bounds::from_points(other.anchor_points()),
        }
    }
}

impl From<Point> for Element {
    fn from(point: Point) -> Self {
        Element::Point(point)
    }
}

impl From<Line> for Element {
    fn from(line: Line) -> Self {
        Element::Line(line)
    }
}

impl From<Circle> for Element {
    fn from(circle: Circle) -> Self {
        Element::Circle(circle)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Point(point) => write!(f, "point {point}"),
            Element::Line(line) => write!(f, "line {line}"),
            Element::Circle(circle) => write!(f, "{circle}"),
            Element::Segment(segment) => write!(f, "{segment}"),
            Element::Polygon(polygon) => write!(f, "{polygon}"),
            Element::Wedge(wedge) => write!(f, "{wedge}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_curves() {
        let point = Element::from(Point::new(0, 0));
        let line = Element::from(Line::through(&Point::new(0, 0), &Point::new(1, 0)).unwrap());
        assert_eq!(point.kind(), ElementKind::Point);
        assert!(!point.kind().is_curve());
        assert!(line.kind().is_curve());
        assert_eq!(ElementKind::ALL.iter().filter(|k| k.is_curve()).count(), 2);
    }

    #[test]
    fn test_bounds() {
        let circle = Element::from(Circle::through(&Point::new(0, 0), &Point::new(0, 2)).unwrap());
        let bounds = circle.bounds().unwrap();
        assert_eq!((bounds.min_x(), bounds.max_y()), (-2.0, 2.0));

        let line = Element::from(Line::through(&Point::new(0, 0), &Point::new(1, 0)).unwrap());
        assert!(line.bounds().is_none());
        assert!(line.anchor_points().is_empty());
    }

    #[test]
    fn test_serde_is_tagged() {
        let point = Element::from(Point::new(1, 2));
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["kind"], "point");
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, point);
    }
}
