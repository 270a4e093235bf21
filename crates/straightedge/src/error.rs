//! Error types for construction operations.
//!
//! This module provides the main error type [`ConstructionError`], which
//! every fallible operation on a [`Model`](crate::Model) returns.

use std::io;

use thiserror::Error;

use straightedge_core::{element::ElementKind, geometry::GeometryError};

use crate::config::ConfigError;

/// The main error type for construction operations.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("element {0} is not in this construction")]
    NotFound(String),

    #[error("no element is labeled {0}")]
    UnknownLabel(String),

    #[error("{kind} needs {expected} points, got {found}")]
    InvalidArity {
        kind: ElementKind,
        expected: String,
        found: usize,
    },

    #[error("{label} is a {found}, expected a {expected}")]
    KindMismatch {
        label: String,
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("cannot remove {label}: {} element(s) depend on it ({})", dependents.len(), dependents.join(", "))]
    DependentsExist {
        label: String,
        dependents: Vec<String>,
    },

    #[error("nothing to sequence: the construction is empty")]
    EmptySequence,

    #[error("step {index} is out of range for a sequence of {len}")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Geometry error: {0}")]
    GeometryUndefined(#[from] GeometryError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid document: {0}")]
    Persist(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for ConstructionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Persist(error.to_string())
    }
}
