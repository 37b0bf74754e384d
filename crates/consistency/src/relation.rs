//! Derivation rules
//!
//! A relation computes one target parameter from an ordered list of input
//! parameters through a fixed operation. The set of operations is closed:
//! every relation is dispatched through [`Op::apply`], there is no
//! expression language.
//!
//! Operations evaluate strictly left to right, so `div_by_square` over
//! `[a, b]` is `(a / b) / b` rather than `a / (b * b)`. This keeps derived
//! values bit-identical to the written form of each rule.

use std::fmt;

use crate::error::ConfigError;
use crate::types::ParamId;

/// Number of inputs an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many inputs
    Fixed(usize),
    /// This many inputs or more
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// A derivation operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// `a + b + ...`
    Sum,
    /// `a - b`
    Difference,
    /// `a * b * ...`
    Product,
    /// `a / b`
    Ratio,
    /// `a / b / b`, e.g. a physical density over `h^2`
    DivBySquare,
    /// `a * b * b`
    MulBySquare,
    /// `(a / b) ** 0.5`
    SqrtRatio,
    /// `c - a - b - ...`, closure of a budget such as a flat universe
    Complement(f64),
    /// `a * c`
    Scale(f64),
    /// `a / c`
    DivConst(f64),
}

impl Op {
    /// Every operation name, as used in model files
    pub const NAMES: [&'static str; 10] = [
        "sum",
        "difference",
        "product",
        "ratio",
        "div_by_square",
        "mul_by_square",
        "sqrt_ratio",
        "complement",
        "scale",
        "div_const",
    ];

    /// Model-file name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Op::Sum => "sum",
            Op::Difference => "difference",
            Op::Product => "product",
            Op::Ratio => "ratio",
            Op::DivBySquare => "div_by_square",
            Op::MulBySquare => "mul_by_square",
            Op::SqrtRatio => "sqrt_ratio",
            Op::Complement(_) => "complement",
            Op::Scale(_) => "scale",
            Op::DivConst(_) => "div_const",
        }
    }

    /// Build an operation from its model-file name and optional constant.
    ///
    /// `complement` defaults its constant to 1.
    pub fn parse(name: &str, constant: Option<f64>) -> Result<Self, ConfigError> {
        let op = match name {
            "sum" => Op::Sum,
            "difference" => Op::Difference,
            "product" => Op::Product,
            "ratio" => Op::Ratio,
            "div_by_square" => Op::DivBySquare,
            "mul_by_square" => Op::MulBySquare,
            "sqrt_ratio" => Op::SqrtRatio,
            "complement" => return Ok(Op::Complement(constant.unwrap_or(1.0))),
            "scale" => Op::Scale(constant.ok_or(ConfigError::MissingConstant { op: "scale" })?),
            "div_const" => Op::DivConst(
                constant.ok_or(ConfigError::MissingConstant { op: "div_const" })?,
            ),
            other => {
                return Err(ConfigError::UnknownOp {
                    name: other.to_string(),
                });
            }
        };
        if constant.is_some() && op.constant().is_none() {
            return Err(ConfigError::UnexpectedConstant { op: op.name() });
        }
        Ok(op)
    }

    /// The constant carried by this operation, if any
    pub fn constant(&self) -> Option<f64> {
        match self {
            Op::Complement(c) | Op::Scale(c) | Op::DivConst(c) => Some(*c),
            _ => None,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Op::Sum | Op::Product | Op::Complement(_) => Arity::AtLeast(1),
            Op::Difference | Op::Ratio | Op::DivBySquare | Op::MulBySquare | Op::SqrtRatio => {
                Arity::Fixed(2)
            }
            Op::Scale(_) | Op::DivConst(_) => Arity::Fixed(1),
        }
    }

    /// Evaluate over already-known inputs.
    ///
    /// The caller guarantees `args.len()` satisfies [`Op::arity`]. Division
    /// by zero or a negative square root produces a non-finite value, which
    /// the engine treats as "not derivable".
    pub fn apply(&self, args: &[f64]) -> f64 {
        match self {
            Op::Sum => args.iter().sum(),
            Op::Difference => args[0] - args[1],
            Op::Product => args.iter().product(),
            Op::Ratio => args[0] / args[1],
            Op::DivBySquare => args[0] / args[1] / args[1],
            Op::MulBySquare => args[0] * args[1] * args[1],
            Op::SqrtRatio => (args[0] / args[1]).sqrt(),
            Op::Complement(total) => args.iter().fold(*total, |acc, x| acc - x),
            Op::Scale(factor) => args[0] * factor,
            Op::DivConst(divisor) => args[0] / divisor,
        }
    }

    /// Render the operation applied to named inputs
    pub fn render(&self, inputs: &[ParamId]) -> String {
        let names: Vec<&str> = inputs.iter().map(ParamId::as_str).collect();
        let arg = |i: usize| names.get(i).copied().unwrap_or("?");
        match self {
            Op::Sum => names.join("+"),
            Op::Difference => format!("{}-{}", arg(0), arg(1)),
            Op::Product => names.join("*"),
            Op::Ratio => format!("{}/{}", arg(0), arg(1)),
            Op::DivBySquare => format!("{0}/{1}/{1}", arg(0), arg(1)),
            Op::MulBySquare => format!("{0}*{1}*{1}", arg(0), arg(1)),
            Op::SqrtRatio => format!("({}/{})**0.5", arg(0), arg(1)),
            Op::Complement(total) => {
                let mut out = total.to_string();
                for name in &names {
                    out.push('-');
                    out.push_str(name);
                }
                out
            }
            Op::Scale(factor) => format!("{}*{}", arg(0), factor),
            Op::DivConst(divisor) => format!("{}/{}", arg(0), divisor),
        }
    }
}

/// One derivation rule: `target = op(inputs...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    target: ParamId,
    op: Op,
    inputs: Vec<ParamId>,
}

impl Relation {
    pub fn new<I>(target: impl Into<ParamId>, op: Op, inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ParamId>,
    {
        Self {
            target: target.into(),
            op,
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn target(&self) -> &ParamId {
        &self.target
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn inputs(&self) -> &[ParamId] {
        &self.inputs
    }

    /// The right-hand side, e.g. `ommh2/h0/h0`
    pub fn expression(&self) -> String {
        self.op.render(&self.inputs)
    }

    /// The whole rule, e.g. `omega_m = ommh2/h0/h0`
    pub fn describe(&self) -> String {
        format!("{} = {}", self.target, self.expression())
    }

    /// Check the rule is well formed on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arity = self.op.arity();
        if !arity.accepts(self.inputs.len()) {
            return Err(ConfigError::ArityMismatch {
                op: self.op.name(),
                expected: arity.to_string(),
                found: self.inputs.len(),
            });
        }
        if let Some(value) = self.op.constant() {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteConstant {
                    op: self.op.name(),
                    value,
                });
            }
        }
        if self.inputs.contains(&self.target) {
            return Err(ConfigError::SelfReference {
                relation: self.describe(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
