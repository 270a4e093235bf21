//! Straightedge Core Types and Definitions
//!
//! This crate provides the foundational types for exact compass-and-straightedge
//! constructions. It includes:
//!
//! - **Numbers**: Exact multi-quadratic field arithmetic ([`number::Surd`])
//! - **Geometry**: Canonical points, lines, circles and figures ([`geometry`] module)
//! - **Elements**: The closed set of constructible elements ([`element::Element`])
//! - **Labels**: String-interned element labels ([`identifier::Label`])
//! - **Engine**: Line, circle and intersection primitives ([`engine::GeometryEngine`])

pub mod element;
pub mod engine;
pub mod geometry;
pub mod identifier;
pub mod number;
