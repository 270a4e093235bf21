//! Exact geometric primitives for compass-and-straightedge constructions.
//!
//! All coordinates are [`Surd`]s and every primitive is stored in a canonical
//! form, so two primitives describing the same figure compare equal and hash
//! alike. Floating point only appears in [`Bounds`] and in the measurement
//! helpers used for presentation.
//!
//! # Overview
//!
//! - [`Point`] - An exact position
//! - [`Line`] - An infinite line `a·x + b·y + c = 0`
//! - [`Circle`] - A center and a squared radius
//! - [`Segment`] - A bounded piece of a line between two endpoints
//! - [`Polygon`] - A closed chain of vertices
//! - [`Wedge`] - A circular sector swept between two points
//! - [`Bounds`] - An approximate bounding box for zooming and plotting
//!
//! # Canonical forms
//!
//! - Lines are scaled so the first non-zero of `(a, b)` is `1`.
//! - Circles keep `r²`, never `r`, so no square root is taken to build one.
//! - Segment endpoints are sorted.
//! - Polygon vertices are rotated and possibly reversed to the smallest
//!   sequence, so every traversal of the same outline is one polygon.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    element::ElementKind,
    number::{NumberError, Surd},
};

/// Errors raised when a construction is geometrically undefined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("coincident points do not define a {0}")]
    CoincidentPoints(ElementKind),

    #[error("circle centered at {center} has zero radius")]
    ZeroRadius { center: String },

    #[error("polygon needs at least 3 distinct vertices, found {found}")]
    TooFewVertices { found: usize },

    #[error("{0} is not a line or circle and cannot be intersected")]
    NotACurve(ElementKind),

    #[error("expected {expected} intersection points, found {found}")]
    MissingIntersection { expected: usize, found: usize },

    #[error(transparent)]
    Number(#[from] NumberError),
}

/// An exact point in the plane.
///
/// # Examples
///
/// ```
/// # use straightedge_core::geometry::Point;
/// # use straightedge_core::number::Surd;
/// let a = Point::new(0, 0);
/// let b = Point::new(Surd::from_ratio(3, 1), 4);
/// assert_eq!(a.distance_squared(&b), Surd::from(25));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: Surd,
    y: Surd,
}

impl Point {
    /// Creates a point from exact coordinates.
    pub fn new(x: impl Into<Surd>, y: impl Into<Surd>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn x(&self) -> &Surd {
        &self.x
    }

    pub fn y(&self) -> &Surd {
        &self.y
    }

    /// Exact squared Euclidean distance.
    pub fn distance_squared(&self, other: &Point) -> Surd {
        (&self.x - &other.x).square() + (&self.y - &other.y).square()
    }

    /// Orders points by exact `x`, then exact `y`.
    pub fn cmp_position(&self, other: &Point) -> Ordering {
        self.x
            .cmp_value(&other.x)
            .then_with(|| self.y.cmp_value(&other.y))
    }

    /// Floating point approximation of the coordinates.
    pub fn to_f64(&self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }

    fn offset(&self, scale: &Surd, dx: &Surd, dy: &Surd) -> Point {
        Point {
            x: &self.x + &(scale * dx),
            y: &self.y + &(scale * dy),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An infinite line `a·x + b·y + c = 0` in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line {
    a: Surd,
    b: Surd,
    c: Surd,
}

impl Line {
    /// The line through two points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CoincidentPoints`] if the points are equal.
    pub fn through(p1: &Point, p2: &Point) -> Result<Self, GeometryError> {
        let a = &p1.y - &p2.y;
        let b = &p2.x - &p1.x;
        let c = &(&p1.x * &p2.y) - &(&p2.x * &p1.y);
        Self::from_coefficients(a, b, c)
    }

    /// Normalizes `a·x + b·y + c = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CoincidentPoints`] if `a` and `b` are both zero.
    pub fn from_coefficients(a: Surd, b: Surd, c: Surd) -> Result<Self, GeometryError> {
        let lead = if a.is_zero() { &b } else { &a };
        if lead.is_zero() {
            return Err(GeometryError::CoincidentPoints(ElementKind::Line));
        }
        let inverse = lead.recip()?;
        Ok(Self {
            a: &a * &inverse,
            b: &b * &inverse,
            c: &c * &inverse,
        })
    }

    /// The normalized coefficients `(a, b, c)`.
    pub fn coefficients(&self) -> (&Surd, &Surd, &Surd) {
        (&self.a, &self.b, &self.c)
    }

    /// Evaluates `a·x + b·y + c` at a point.
    pub fn evaluate(&self, point: &Point) -> Surd {
        &(&(&self.a * &point.x) + &(&self.b * &point.y)) + &self.c
    }

    /// Returns `true` if the point lies on the line.
    pub fn contains(&self, point: &Point) -> bool {
        self.evaluate(point).is_zero()
    }

    /// Intersection with another line; empty when parallel or identical.
    pub fn intersect_line(&self, other: &Line) -> Result<Vec<Point>, GeometryError> {
        let det = &(&self.a * &other.b) - &(&other.a * &self.b);
        if det.is_zero() {
            return Ok(Vec::new());
        }
        let inverse = det.recip()?;
        let x = &(&(&self.b * &other.c) - &(&other.b * &self.c)) * &inverse;
        let y = &(&(&self.c * &other.a) - &(&other.c * &self.a)) * &inverse;
        Ok(vec![Point { x, y }])
    }

    /// Intersection with a circle: zero, one (tangent) or two points, sorted.
    pub fn intersect_circle(
        &self,
        circle: &Circle,
        factor_limit: u64,
    ) -> Result<Vec<Point>, GeometryError> {
        let norm = &self.a.square() + &self.b.square();
        let inverse_norm = norm.recip()?;
        let value = self.evaluate(&circle.center);

        // foot of the perpendicular from the center
        let foot = circle.center.offset(&-(&value * &inverse_norm), &self.a, &self.b);

        // points sit at foot ± s·(-b, a) with s² = (r²·n - value²) / n²
        let s_squared = &(&(&circle.radius_sq * &norm) - &value.square()) * &inverse_norm.square();
        let mut points = match s_squared.cmp_zero() {
            Ordering::Less => Vec::new(),
            Ordering::Equal => vec![foot],
            Ordering::Greater => {
                let s = s_squared.sqrt(factor_limit)?;
                let dx = -&self.b;
                vec![
                    foot.offset(&s, &dx, &self.a),
                    foot.offset(&-&s, &dx, &self.a),
                ]
            }
        };
        points.sort_by(Point::cmp_position);
        Ok(points)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (coefficient, variable) in [(&self.a, "x"), (&self.b, "y"), (&self.c, "")] {
            if coefficient.is_zero() {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match (coefficient == &Surd::one(), variable.is_empty()) {
                (true, false) => write!(f, "{variable}")?,
                (_, true) => write!(f, "{coefficient}")?,
                (false, false) if coefficient.is_rational() => write!(f, "{coefficient}{variable}")?,
                (false, false) => write!(f, "({coefficient}){variable}")?,
            }
        }
        write!(f, " = 0")
    }
}

/// A circle given by its center and squared radius.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Circle {
    center: Point,
    radius_sq: Surd,
}

impl Circle {
    /// The circle around `center` passing through `through`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroRadius`] if the points are equal.
    pub fn through(center: &Point, through: &Point) -> Result<Self, GeometryError> {
        Self::from_radius_squared(center.clone(), center.distance_squared(through))
    }

    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroRadius`] unless `radius_sq` is positive.
    pub fn from_radius_squared(center: Point, radius_sq: Surd) -> Result<Self, GeometryError> {
        if radius_sq.cmp_zero() != Ordering::Greater {
            return Err(GeometryError::ZeroRadius {
                center: center.to_string(),
            });
        }
        Ok(Self { center, radius_sq })
    }

    pub fn center(&self) -> &Point {
        &self.center
    }

    pub fn radius_squared(&self) -> &Surd {
        &self.radius_sq
    }

    /// Approximate radius.
    pub fn radius(&self) -> f64 {
        self.radius_sq.to_f64().sqrt()
    }

    /// Approximate area.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius_sq.to_f64()
    }

    /// Returns `true` if the point lies on the circumference.
    pub fn contains(&self, point: &Point) -> bool {
        self.center.distance_squared(point) == self.radius_sq
    }

    /// Intersection with another circle, through their radical line.
    ///
    /// Concentric circles have no intersection points, including a circle
    /// with itself.
    pub fn intersect_circle(
        &self,
        other: &Circle,
        factor_limit: u64,
    ) -> Result<Vec<Point>, GeometryError> {
        if self.center == other.center {
            return Ok(Vec::new());
        }
        let two = Surd::from(2);
        let (h1, k1) = (&self.center.x, &self.center.y);
        let (h2, k2) = (&other.center.x, &other.center.y);
        let power = |h: &Surd, k: &Surd, r_sq: &Surd| &(&h.square() + &k.square()) - r_sq;
        let radical_line = Line::from_coefficients(
            &two * &(h2 - h1),
            &two * &(k2 - k1),
            &power(h1, k1, &self.radius_sq) - &power(h2, k2, &other.radius_sq),
        )?;
        radical_line.intersect_circle(self, factor_limit)
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle at {} with r² = {}", self.center, self.radius_sq)
    }
}

/// A segment between two distinct points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    endpoints: [Point; 2],
}

impl Segment {
    /// # Errors
    ///
    /// Returns [`GeometryError::CoincidentPoints`] if the endpoints are equal.
    pub fn new(p1: Point, p2: Point) -> Result<Self, GeometryError> {
        if p1 == p2 {
            return Err(GeometryError::CoincidentPoints(ElementKind::Segment));
        }
        let endpoints = if p1 <= p2 { [p1, p2] } else { [p2, p1] };
        Ok(Self { endpoints })
    }

    pub fn endpoints(&self) -> &[Point; 2] {
        &self.endpoints
    }

    /// Exact squared length.
    pub fn length_squared(&self) -> Surd {
        self.endpoints[0].distance_squared(&self.endpoints[1])
    }

    /// Approximate length.
    pub fn length(&self) -> f64 {
        self.length_squared().to_f64().sqrt()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment {} to {}", self.endpoints[0], self.endpoints[1])
    }
}

/// A closed polygon with at least three distinct vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// # Errors
    ///
    /// Returns [`GeometryError::TooFewVertices`] with fewer than three
    /// distinct vertices.
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        let mut distinct = vertices.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < 3 || distinct.len() != vertices.len() {
            return Err(GeometryError::TooFewVertices {
                found: distinct.len(),
            });
        }
        Ok(Self {
            vertices: canonical_cycle(vertices),
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Sides as consecutive vertex pairs, closing back to the first vertex.
    pub fn sides(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Exact area by the shoelace formula.
    pub fn area_exact(&self) -> Surd {
        let twice = self
            .sides()
            .fold(Surd::zero(), |acc, (p, q)| acc + (&p.x * &q.y) - (&q.x * &p.y));
        twice
            .abs()
            .scale(&num_rational::BigRational::new(1.into(), 2.into()))
    }

    /// Approximate area.
    pub fn area(&self) -> f64 {
        self.area_exact().to_f64()
    }

    /// Approximate perimeter.
    pub fn perimeter(&self) -> f64 {
        self.sides()
            .map(|(p, q)| p.distance_squared(q).to_f64().sqrt())
            .sum()
    }
}

/// Smallest rotation of the cycle or its reversal.
fn canonical_cycle(vertices: Vec<Point>) -> Vec<Point> {
    let n = vertices.len();
    let mut reversed = vertices.clone();
    reversed.reverse();
    let mut best = vertices.clone();
    for base in [&vertices, &reversed] {
        for start in 0..n {
            let candidate: Vec<Point> = base.iter().cycle().skip(start).take(n).cloned().collect();
            if candidate < best {
                best = candidate;
            }
        }
    }
    best
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "polygon")?;
        for vertex in &self.vertices {
            write!(f, " {vertex}")?;
        }
        Ok(())
    }
}

/// A circular sector around `center`, swept counter-clockwise from the ray
/// through `start` to the ray through `end`, with radius `|center radius_point|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Wedge {
    center: Point,
    radius_point: Point,
    start: Point,
    end: Point,
}

impl Wedge {
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroRadius`] if `radius_point` is the center.
    pub fn new(
        center: Point,
        radius_point: Point,
        start: Point,
        end: Point,
    ) -> Result<Self, GeometryError> {
        if center == radius_point {
            return Err(GeometryError::ZeroRadius {
                center: center.to_string(),
            });
        }
        Ok(Self {
            center,
            radius_point,
            start,
            end,
        })
    }

    pub fn center(&self) -> &Point {
        &self.center
    }

    pub fn radius_point(&self) -> &Point {
        &self.radius_point
    }

    pub fn start(&self) -> &Point {
        &self.start
    }

    pub fn end(&self) -> &Point {
        &self.end
    }

    /// Exact squared radius.
    pub fn radius_squared(&self) -> Surd {
        self.center.distance_squared(&self.radius_point)
    }

    /// Counter-clockwise sweep in radians, in `[0, 2π)`.
    pub fn sweep_angle(&self) -> f64 {
        let (cx, cy) = self.center.to_f64();
        let angle = |p: &Point| {
            let (x, y) = p.to_f64();
            (y - cy).atan2(x - cx)
        };
        (angle(&self.end) - angle(&self.start)).rem_euclid(std::f64::consts::TAU)
    }

    /// Approximate sector area.
    pub fn area(&self) -> f64 {
        self.radius_squared().to_f64() * self.sweep_angle() / 2.0
    }
}

impl fmt::Display for Wedge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wedge at {} through {} from {} to {}",
            self.center, self.radius_point, self.start, self.end
        )
    }
}

/// An approximate axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Margin used when both extents are zero.
    pub const DEFAULT_MARGIN: f64 = 0.5;

    /// A zero-size box at a point.
    pub fn from_point(point: &Point) -> Self {
        let (x, y) = point.to_f64();
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// The box enclosing a circle.
    pub fn from_circle(circle: &Circle) -> Self {
        let r = circle.radius();
        let (x, y) = circle.center.to_f64();
        Self {
            min_x: x - r,
            min_y: y - r,
            max_x: x + r,
            max_y: y + r,
        }
    }

    /// The smallest box containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points
            .into_iter()
            .map(Self::from_point)
            .reduce(Self::merge)
    }

    pub fn min_x(self) -> f64 {
        self.min_x
    }

    pub fn min_y(self) -> f64 {
        self.min_y
    }

    pub fn max_x(self) -> f64 {
        self.max_x
    }

    pub fn max_y(self) -> f64 {
        self.max_y
    }

    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the smallest box containing both.
    pub fn merge(self, other: Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows each side by `ratio` of the extent.
    ///
    /// A zero extent borrows the margin of the other axis; when both are zero
    /// [`Self::DEFAULT_MARGIN`] is used.
    pub fn with_margin(self, ratio: f64) -> Self {
        let (width, height) = (self.width(), self.height());
        let (x_margin, y_margin) = match (width > 0.0, height > 0.0) {
            (true, true) => (width * ratio, height * ratio),
            (true, false) => (width * ratio, width * ratio),
            (false, true) => (height * ratio, height * ratio),
            (false, false) => (Self::DEFAULT_MARGIN, Self::DEFAULT_MARGIN),
        };
        Self {
            min_x: self.min_x - x_margin,
            min_y: self.min_y - y_margin,
            max_x: self.max_x + x_margin,
            max_y: self.max_y + y_margin,
        }
    }
}
