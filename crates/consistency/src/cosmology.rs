//! Cosmological density-parameter relations
//!
//! There are several interchangeable ways to specify a background
//! cosmology: `omega_m` versus `ommh2`, `omega_b` versus the baryon
//! fraction, `omega_lambda` versus `omega_k`, and so on. This table ties
//! them together so any sufficient subset can be completed and any
//! redundant subset checked.
//!
//! Escalating assumptions: first nothing, then `omega_nu = 0`, then also
//! `omega_k = 0`.
//!
//! ```
//! use cosmosis_consistency::{cosmology_consistency, Parameters};
//!
//! let engine = cosmology_consistency().unwrap();
//! let p: Parameters = [("omega_m", 0.3), ("hubble", 72.0), ("omega_b", 0.04), ("omega_k", 0.0)]
//!     .into_iter()
//!     .map(|(k, v)| (k.into(), v))
//!     .collect();
//! let q = engine.complete(&p).unwrap();
//! assert!((q.get("omega_lambda").unwrap() - 0.7).abs() < 1e-9);
//! ```

use crate::engine::Consistency;
use crate::error::ConfigError;
use crate::relation::{Op, Relation};
use crate::types::Assumption;

fn rel<const N: usize>(target: &str, op: Op, inputs: [&str; N]) -> Relation {
    Relation::new(target, op, inputs)
}

/// The density-parameter relation table, in application order
pub fn cosmology_relations() -> Vec<Relation> {
    vec![
        rel("omega_m", Op::DivBySquare, ["ommh2", "h0"]),
        rel("omega_b", Op::DivBySquare, ["ombh2", "h0"]),
        rel("omega_c", Op::DivBySquare, ["omch2", "h0"]),
        rel("omega_nu", Op::DivBySquare, ["omnuh2", "h0"]),
        rel("ommh2", Op::MulBySquare, ["omega_m", "h0"]),
        rel("ombh2", Op::MulBySquare, ["omega_b", "h0"]),
        rel("omch2", Op::MulBySquare, ["omega_c", "h0"]),
        rel("omnuh2", Op::MulBySquare, ["omega_nu", "h0"]),
        rel("omch2", Op::Difference, ["ommh2", "ombh2"]),
        rel("ommh2", Op::Sum, ["omch2", "ombh2"]),
        rel("baryon_fraction", Op::Ratio, ["omega_b", "omega_m"]),
        rel("omega_b", Op::Product, ["omega_m", "baryon_fraction"]),
        rel("omega_m", Op::Ratio, ["omega_b", "baryon_fraction"]),
        rel("baryon_fraction", Op::Ratio, ["ombh2", "ommh2"]),
        rel("ombh2", Op::Product, ["ommh2", "baryon_fraction"]),
        rel("ommh2", Op::Ratio, ["ombh2", "baryon_fraction"]),
        rel("omega_m", Op::Sum, ["omega_b", "omega_c"]),
        rel("h0", Op::SqrtRatio, ["ommh2", "omega_m"]),
        rel("h0", Op::SqrtRatio, ["ombh2", "omega_b"]),
        rel("h0", Op::SqrtRatio, ["omch2", "omega_c"]),
        // No `h0 = (omnuh2/omega_nu)**0.5`: undefined at the omega_nu = 0 default
        rel("h0", Op::DivConst(100.0), ["hubble"]),
        rel("hubble", Op::Scale(100.0), ["h0"]),
        rel("omega_lambda", Op::Complement(1.0), ["omega_m", "omega_k", "omega_nu"]),
        rel("omega_m", Op::Complement(1.0), ["omega_lambda", "omega_k", "omega_nu"]),
        rel("omega_k", Op::Complement(1.0), ["omega_m", "omega_lambda", "omega_nu"]),
        rel("omega_nu", Op::Complement(1.0), ["omega_m", "omega_lambda", "omega_k"]),
    ]
}

/// Massless neutrinos first, then spatial flatness
pub fn cosmology_defaults() -> Vec<Assumption> {
    vec![Assumption::new("omega_nu", 0.0), Assumption::new("omega_k", 0.0)]
}

/// An engine over the cosmology table
pub fn cosmology_consistency() -> Result<Consistency, ConfigError> {
    Consistency::new(cosmology_relations(), cosmology_defaults())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamId, Parameters, Provenance};

    fn params(values: &[(&str, f64)]) -> Parameters {
        values.iter().map(|&(k, v)| (ParamId::from(k), v)).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("parameter missing from completion");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_table_builds() {
        let engine = cosmology_consistency().unwrap();
        assert_eq!(engine.relations().len(), 26);
        assert_eq!(engine.max_passes(), 27);
        let names: Vec<&str> = engine.parameters().map(ParamId::as_str).collect();
        assert_eq!(
            names,
            vec![
                "omega_m",
                "omega_b",
                "omega_c",
                "omega_nu",
                "ommh2",
                "ombh2",
                "omch2",
                "omnuh2",
                "baryon_fraction",
                "h0",
                "hubble",
                "omega_lambda",
                "omega_k",
            ]
        );
    }

    #[test]
    fn test_under_specified() {
        let engine = cosmology_consistency().unwrap();
        let err = engine.complete(&params(&[("omega_m", 0.3), ("hubble", 72.0)])).unwrap_err();
        assert!(err.is_under_specified());
        assert!(err.to_string().contains("omega_b"));
        assert!(err.to_string().contains("baryon_fraction"));
    }

    #[test]
    fn test_defaults() {
        let engine = cosmology_consistency().unwrap();
        let q = engine
            .complete(&params(&[("omega_m", 0.3), ("hubble", 72.0), ("baryon_fraction", 0.02)]))
            .unwrap();

        assert_eq!(q.assumptions, 2);
        assert_close(q.get("omega_b"), 0.006);
        assert_close(q.get("omega_lambda"), 0.7);
        assert_eq!(q.provenance[&ParamId::from("omega_k")], Provenance::Assumed);
    }

    #[test]
    fn test_fully_specified() {
        let engine = cosmology_consistency().unwrap();
        let p = params(&[("omega_m", 0.3), ("hubble", 72.0), ("omega_b", 0.04), ("omega_k", 0.0)]);
        let q = engine.complete(&p).unwrap();

        assert_eq!(q.assumptions, 1);
        assert_close(q.get("h0"), 0.72);
        assert_close(q.get("ommh2"), 0.15552);
        assert_close(q.get("ombh2"), 0.020736);
        assert_close(q.get("omega_c"), 0.26);
        assert_close(q.get("baryon_fraction"), 0.04 / 0.3);
        assert_close(q.get("omega_nu"), 0.0);
        assert_close(q.get("omega_lambda"), 0.7);
        assert_eq!(q.parameters.len(), 13);

        let r = engine.complete(&q.parameters).unwrap();
        assert_eq!(q.parameters, r.parameters);
        assert_eq!(r.assumptions, 0);
    }

    #[test]
    fn test_over_specified() {
        let engine = cosmology_consistency().unwrap();
        let err = engine
            .complete(&params(&[
            ("omega_m", 0.3),
            ("hubble", 72.0),
            ("omega_b", 0.04),
            ("omega_c", 0.1),
        ]))
            .unwrap_err();
        match err {
            crate::Error::OverSpecified {
                parameter,
                existing,
                derived,
                relation,
            } => {
                assert_eq!(parameter.as_str(), "omega_m");
                assert_eq!(existing, 0.3);
                assert_close(Some(derived), 0.14);
                assert_eq!(relation, "omega_m = omega_b+omega_c");
            }
            other => panic!("expected over-specified, got {other:?}"),
        }
    }
}
