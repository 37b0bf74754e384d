//! Floating-point agreement between two derivations of one parameter

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Relative and absolute tolerance used for conflict detection.
///
/// Two values agree when `|existing - derived| <= atol + rtol * |derived|`,
/// the same asymmetric rule as numpy's `allclose`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
}

pub const DEFAULT_RTOL: f64 = 1e-5;
pub const DEFAULT_ATOL: f64 = 1e-8;

fn default_rtol() -> f64 {
    DEFAULT_RTOL
}

fn default_atol() -> f64 {
    DEFAULT_ATOL
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Check whether a derived value agrees with the one already held
    pub fn is_close(&self, existing: f64, derived: f64) -> bool {
        if existing == derived {
            return true;
        }
        (existing - derived).abs() <= self.atol + self.rtol * derived.abs()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let ok = |t: f64| t.is_finite() && t >= 0.0;
        if ok(self.rtol) && ok(self.atol) {
            Ok(())
        } else {
            Err(ConfigError::InvalidTolerance {
                rtol: self.rtol,
                atol: self.atol,
            })
        }
    }
}
