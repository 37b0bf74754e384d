//! Consistency errors

use thiserror::Error;

use crate::types::ParamId;

/// Consistency result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`Consistency::complete`](crate::Consistency::complete)
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Two derivations of the same parameter disagree.
    ///
    /// Never retried with more defaults.
    #[error(
        "model over-specified: consistency relations failed for parameter {parameter} \
         (values {existing} and {derived}, from {relation})"
    )]
    OverSpecified {
        parameter: ParamId,
        existing: f64,
        derived: f64,
        relation: String,
    },

    /// Some parameters are still unknown after every default was tried
    #[error("model under-specified: could not compute these values: {}", join(.unresolved))]
    UnderSpecified { unresolved: Vec<ParamId> },

    /// The caller supplied a NaN or infinite value
    #[error("invalid value for {parameter}: {value}")]
    InvalidValue { parameter: ParamId, value: f64 },
}

impl Error {
    pub fn is_over_specified(&self) -> bool {
        matches!(self, Error::OverSpecified { .. })
    }

    pub fn is_under_specified(&self) -> bool {
        matches!(self, Error::UnderSpecified { .. })
    }
}

/// Problems with a relation table or default list.
///
/// These indicate a broken model rather than bad caller input, and are
/// reported when the engine is constructed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("relation set is empty")]
    EmptyRelationSet,

    #[error("relation `{relation}` reads unknown parameter {parameter}")]
    UnknownParameter { relation: String, parameter: ParamId },

    #[error("relation `{relation}` reads its own target")]
    SelfReference { relation: String },

    #[error("unknown operation `{name}`")]
    UnknownOp { name: String },

    #[error("{op} takes {expected} inputs, found {found}")]
    ArityMismatch {
        op: &'static str,
        expected: String,
        found: usize,
    },

    #[error("{op} requires a constant")]
    MissingConstant { op: &'static str },

    #[error("{op} does not take a constant")]
    UnexpectedConstant { op: &'static str },

    #[error("{op} constant must be finite, got {value}")]
    NonFiniteConstant { op: &'static str, value: f64 },

    #[error("default for {parameter} given more than once")]
    DuplicateDefault { parameter: ParamId },

    #[error("default for {parameter} must be finite, got {value}")]
    NonFiniteDefault { parameter: ParamId, value: f64 },

    #[error("tolerance must be finite and non-negative (rtol {rtol}, atol {atol})")]
    InvalidTolerance { rtol: f64, atol: f64 },
}

fn join(names: &[ParamId]) -> String {
    names
        .iter()
        .map(ParamId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_specified_lists_names() {
        let err = Error::UnderSpecified {
            unresolved: vec!["omega_b".into(), "ombh2".into()],
        };
        assert_eq!(
            err.to_string(),
            "model under-specified: could not compute these values: omega_b, ombh2"
        );
        assert!(err.is_under_specified());
        assert!(!err.is_over_specified());
    }

    #[test]
    fn test_over_specified_names_parameter_and_values() {
        let err = Error::OverSpecified {
            parameter: "omega_m".into(),
            existing: 0.3,
            derived: 0.14,
            relation: "omega_m = omega_b+omega_c".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("omega_m"));
        assert!(msg.contains("0.3"));
        assert!(msg.contains("0.14"));
        assert!(err.is_over_specified());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ArityMismatch {
            op: "ratio",
            expected: "2".to_string(),
            found: 3,
        };
        assert_eq!(err.to_string(), "ratio takes 2 inputs, found 3");
    }
}
