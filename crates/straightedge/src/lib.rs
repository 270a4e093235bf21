//! Straightedge - exact compass-and-straightedge constructions.
//!
//! Build a construction from given points, lines through two points and
//! circles about a center. Every new line or circle is intersected with what
//! is already there, and the resulting points are added with exact
//! coordinates, so repeated discoveries of the same point collapse into one
//! labeled element.
//!
//! # Overview
//!
//! - [`Model`] - The construction and its operations
//! - [`ElementStore`] - Ordered, deduplicating storage with labels and lineage
//! - [`ConstructionGraph`] - Ancestor and descendant queries
//! - [`Sequencer`] - Step-by-step reveal of the construction
//! - [`config`] - Settings loaded from TOML
//! - [`persist`] - JSON documents for saving and loading
//! - [`report`] - Plain-text listings
//!
//! # Example
//!
//! ```
//! use straightedge::Model;
//!
//! let mut model = Model::new("vesica");
//! let a = model.set_point(0, 0, &["given"]).unwrap().element;
//! let b = model.set_point(1, 0, &["given"]).unwrap().element;
//! model.construct_line(a, b).unwrap();
//! model.construct_circle(a, b).unwrap();
//! model.construct_circle(b, a).unwrap();
//!
//! let labels: Vec<String> = model
//!     .points()
//!     .into_iter()
//!     .map(|p| model.store().get(p).unwrap().label().to_string())
//!     .collect();
//! assert_eq!(labels, ["A", "B", "C", "D", "E", "F"]);
//! ```

pub mod config;
pub mod persist;
pub mod report;

mod error;
mod graph;
mod label;
mod model;
mod sequencer;
mod store;

pub use straightedge_core::{element, engine, geometry, identifier, number};

pub use error::ConstructionError;
pub use graph::ConstructionGraph;
pub use label::{LabelAllocator, LabelPools};
pub use model::{Constructed, Model};
pub use sequencer::{Frame, Overlay, Presenter, Reveal, Sequencer};
pub use store::{ElementDetails, ElementRef, ElementStore, Inserted};
