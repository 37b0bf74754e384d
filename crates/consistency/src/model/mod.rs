//! Model Files
//!
//! A model file describes a relation table, its default escalation list and
//! optionally the conflict tolerance, so an engine can be configured as data
//! rather than code.
//!
//! # File Format
//!
//! ```yaml
//! apiVersion: consistency/v1
//! kind: ConsistencyModel
//!
//! metadata:
//!   name: hubble
//!   description: "Hubble parameter in two conventions"
//!
//! tolerance:
//!   rtol: 1.0e-5
//!   atol: 1.0e-8
//!
//! relations:
//!   - target: h0
//!     op: div_const
//!     constant: 100
//!     inputs: [hubble]
//!   - target: hubble
//!     op: scale
//!     constant: 100
//!     inputs: [h0]
//!
//! # Tried in order, as a growing prefix
//! defaults:
//!   - name: hubble
//!     value: 70.0
//! ```
//!
//! Operation names are those of [`Op::NAMES`](crate::Op::NAMES).
//! `complement` takes an optional constant (default 1); `scale` and
//! `div_const` require one; the rest take none.

mod types;

#[cfg(test)]
mod tests;

pub use types::*;
