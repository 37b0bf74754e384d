//! CosmoSIS Consistency
//!
//! Fills in and cross-checks redundant parameter sets.
//!
//! A [`Consistency`] engine holds an ordered table of [`Relation`]s, each
//! deriving one parameter from others, and an ordered list of default
//! [`Assumption`]s. Given a partial assignment it propagates the relations
//! until every relation target is known, bringing in defaults one at a time
//! only while the model stays under-specified. Two derivations of the same
//! parameter that disagree beyond the [`Tolerance`] fail the call as
//! over-specified.
//!
//! The [`cosmology`] module instantiates the engine for background
//! cosmology density parameters; [`model`] loads tables from YAML.

mod assignment;
pub mod cosmology;
pub mod engine;
pub mod error;
pub mod model;
pub mod relation;
pub mod tolerance;
pub mod types;

pub use cosmology::{cosmology_consistency, cosmology_defaults, cosmology_relations};
pub use engine::Consistency;
pub use error::{ConfigError, Error, Result};
pub use model::{Model, ModelError};
pub use relation::{Arity, Op, Relation};
pub use tolerance::Tolerance;
pub use types::*;
