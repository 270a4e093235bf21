//! Construction primitives behind a swappable engine.
//!
//! The construction model never computes geometry directly; it asks a
//! [`GeometryEngine`] to build lines and circles and to intersect them. The
//! default [`ExactEngine`] works in exact [`Surd`](crate::number::Surd)
//! arithmetic.

use log::trace;

use crate::{
    element::Element,
    geometry::{Circle, GeometryError, Line, Point},
    number::DEFAULT_FACTOR_LIMIT,
};

/// Builds and intersects construction primitives.
///
/// Implementations must return intersection points sorted ascending by
/// exact `x`, then `y`, so that label assignment is deterministic.
pub trait GeometryEngine {
    /// The line through two distinct points.
    fn line_through(&self, p1: &Point, p2: &Point) -> Result<Line, GeometryError>;

    /// The circle around `center` through `through`.
    fn circle(&self, center: &Point, through: &Point) -> Result<Circle, GeometryError>;

    /// All intersection points of two lines or circles.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotACurve`] if either element is not a line
    /// or circle.
    fn intersect(&self, first: &Element, second: &Element) -> Result<Vec<Point>, GeometryError>;

    /// Exact identity of two elements.
    fn exact_eq(&self, first: &Element, second: &Element) -> bool {
        first == second
    }
}

/// Exact arithmetic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactEngine {
    factor_limit: u64,
}

impl ExactEngine {
    /// Creates an engine that factors radicands by trial division up to
    /// `factor_limit`.
    pub fn new(factor_limit: u64) -> Self {
        Self { factor_limit }
    }

    pub fn factor_limit(&self) -> u64 {
        self.factor_limit
    }
}

impl Default for ExactEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FACTOR_LIMIT)
    }
}

impl GeometryEngine for ExactEngine {
    fn line_through(&self, p1: &Point, p2: &Point) -> Result<Line, GeometryError> {
        Line::through(p1, p2)
    }

    fn circle(&self, center: &Point, through: &Point) -> Result<Circle, GeometryError> {
        Circle::through(center, through)
    }

    fn intersect(&self, first: &Element, second: &Element) -> Result<Vec<Point>, GeometryError> {
        let points = match (first, second) {
            (Element::Line(l1), Element::Line(l2)) => l1.intersect_line(l2)?,
            (Element::Line(line), Element::Circle(circle))
            | (Element::Circle(circle), Element::Line(line)) => {
                line.intersect_circle(circle, self.factor_limit)?
            }
            (Element::Circle(c1), Element::Circle(c2)) => {
                c1.intersect_circle(c2, self.factor_limit)?
            }
            (Element::Line(_) | Element::Circle(_), other) | (other, _) => {
                return Err(GeometryError::NotACurve(other.kind()));
            }
        };
        trace!(count = points.len(); "Intersected {} with {}", first.kind(), second.kind());
        Ok(points)
    }
}
