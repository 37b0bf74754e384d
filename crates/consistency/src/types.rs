//! Core parameter types
//!
//! Parameters are plain named scalars. The engine never interprets a name,
//! it only uses names to wire relations together.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of a scalar parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(pub String);

impl ParamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ParamId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParamId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An ordered mapping of parameter names to values.
///
/// This is both the input to and the output of the engine. Insertion order
/// is preserved so results print deterministically.
pub type Parameters = IndexMap<ParamId, f64>;

/// A fallback value, injected only when the model cannot be completed
/// without it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub name: ParamId,
    pub value: f64,
}

impl Assumption {
    pub fn new(name: impl Into<ParamId>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// State of one parameter during propagation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Slot {
    /// Not yet known
    #[default]
    Unspecified,
    /// Known, either supplied, assumed or derived
    Specified(f64),
}

impl Slot {
    pub fn value(&self) -> Option<f64> {
        match self {
            Slot::Specified(v) => Some(*v),
            Slot::Unspecified => None,
        }
    }

    pub fn is_specified(&self) -> bool {
        matches!(self, Slot::Specified(_))
    }
}

/// Where a completed parameter's value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Given by the caller
    Supplied,
    /// Injected from the default escalation list
    Assumed,
    /// Computed by a relation (rendered as `target = expression`)
    Derived { relation: String },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Supplied => write!(f, "supplied"),
            Provenance::Assumed => write!(f, "assumed"),
            Provenance::Derived { relation } => write!(f, "derived from {relation}"),
        }
    }
}

/// A complete, mutually consistent assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Every parameter the engine knows about, followed by any caller
    /// parameters that no relation mentions
    pub parameters: Parameters,
    /// Number of defaults (a prefix of the escalation list) that were needed
    pub assumptions: usize,
    /// How each parameter obtained its value
    pub provenance: IndexMap<ParamId, Provenance>,
}

impl Completion {
    /// Look up a completed value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Consume the completion, keeping only the values
    pub fn into_parameters(self) -> Parameters {
        self.parameters
    }
}
