//! Model type definitions and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cosmology::{cosmology_defaults, cosmology_relations};
use crate::engine::Consistency;
use crate::error::ConfigError;
use crate::relation::{Op, Relation};
use crate::tolerance::Tolerance;
use crate::types::{Assumption, ParamId};

pub const API_VERSION: &str = "consistency/v1";
pub const KIND: &str = "ConsistencyModel";

/// Errors that can occur when loading or building a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Failed to read the model file.
    #[error("failed to read model file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the model YAML.
    #[error("failed to parse model YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid API version.
    #[error("invalid apiVersion: expected '{expected}', got '{0}'", expected = API_VERSION)]
    InvalidApiVersion(String),

    /// Invalid kind.
    #[error("invalid kind: expected '{expected}', got '{0}'", expected = KIND)]
    InvalidKind(String),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The relation table or defaults are malformed.
    #[error("invalid model: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// A relation table plus default escalation list, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// API version for compatibility checking.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Kind must be "ConsistencyModel".
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Model metadata.
    #[serde(default)]
    pub metadata: ModelMetadata,

    /// Conflict tolerance; the engine default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Tolerance>,

    /// Relations in application order.
    #[serde(default)]
    pub relations: Vec<RelationSpec>,

    /// Defaults in escalation order.
    #[serde(default)]
    pub defaults: Vec<Assumption>,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

/// Metadata for a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Machine identifier for this model.
    pub name: String,

    /// What the parameters describe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One relation as written in a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSpec {
    pub target: ParamId,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<f64>,
    pub inputs: Vec<ParamId>,
}

impl RelationSpec {
    /// Resolve the operation name into a relation.
    pub fn to_relation(&self) -> Result<Relation, ConfigError> {
        let op = Op::parse(&self.op, self.constant)?;
        Ok(Relation::new(self.target.clone(), op, self.inputs.iter().cloned()))
    }
}

impl From<&Relation> for RelationSpec {
    fn from(relation: &Relation) -> Self {
        let op = relation.op();
        let constant = match op {
            Op::Complement(c) if c == 1.0 => None,
            _ => op.constant(),
        };
        Self {
            target: relation.target().clone(),
            op: op.name().to_string(),
            constant,
            inputs: relation.inputs().to_vec(),
        }
    }
}

impl Model {
    /// Create a model from in-memory tables.
    pub fn from_tables(
        name: impl Into<String>,
        relations: &[Relation],
        defaults: &[Assumption],
    ) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ModelMetadata {
                name: name.into(),
                description: None,
            },
            tolerance: None,
            relations: relations.iter().map(RelationSpec::from).collect(),
            defaults: defaults.to_vec(),
        }
    }

    /// The built-in cosmology table as a model.
    pub fn cosmology() -> Self {
        Self::from_tables("cosmology", &cosmology_relations(), &cosmology_defaults())
            .with_description("Background cosmology density parameters")
    }

    /// Load a model from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a model from a YAML string.
    pub fn from_yaml(yaml: &str) -> ModelResult<Self> {
        let model: Model = serde_yaml::from_str(yaml)?;
        model.validate_schema()?;
        Ok(model)
    }

    /// Serialize the model to YAML.
    pub fn to_yaml(&self) -> ModelResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the model schema (API version, kind, name).
    fn validate_schema(&self) -> ModelResult<()> {
        if self.api_version != API_VERSION {
            return Err(ModelError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ModelError::InvalidKind(self.kind.clone()));
        }
        if self.metadata.name.is_empty() {
            return Err(ModelError::MissingField("metadata.name".to_string()));
        }
        Ok(())
    }

    /// Build an engine from this model.
    pub fn build(&self) -> ModelResult<Consistency> {
        let relations = self
            .relations
            .iter()
            .map(RelationSpec::to_relation)
            .collect::<Result<Vec<_>, _>>()?;
        let engine = Consistency::new(relations, self.defaults.clone())?;
        match self.tolerance {
            Some(tolerance) => Ok(engine.with_tolerance(tolerance)?),
            None => Ok(engine),
        }
    }

    /// Builder method: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Builder method: set the tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}
