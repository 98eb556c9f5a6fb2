//! Structural type sketches.
//!
//! A sketch describes the shape of a value without naming a Rust type, so
//! the exemplar generator can synthesize plausible instances for tool
//! discovery and few-shot JSON examples. Interface sketches are resolved
//! through an explicit registry supplied at configuration time.

use serde::{Deserialize, Serialize};

/// Shape of a value, as registered alongside actions and domain types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSketch {
    /// Free-form text.
    Text,
    /// Integral number.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// Point in time.
    Timestamp,
    /// One of a closed set of constants.
    Enum { variants: Vec<String> },
    /// Homogeneous list.
    List { elem: Box<TypeSketch> },
    /// Named record with fields.
    Struct { name: String, fields: Vec<FieldSketch> },
    /// Abstract type; a concrete sketch must be registered for it.
    Interface { name: String },
}

impl TypeSketch {
    pub fn list(elem: TypeSketch) -> Self {
        Self::List {
            elem: Box::new(elem),
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<FieldSketch>) -> Self {
        Self::Struct {
            name: name.into(),
            fields,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::Interface { name: name.into() }
    }
}

/// One named field of a struct sketch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSketch {
    pub name: String,
    pub sketch: TypeSketch,
}

impl FieldSketch {
    pub fn new(name: impl Into<String>, sketch: TypeSketch) -> Self {
        Self {
            name: name.into(),
            sketch,
        }
    }
}
