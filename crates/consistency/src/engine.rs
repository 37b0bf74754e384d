//! Consistency engine
//!
//! Completes a partial parameter assignment by repeatedly applying
//! relations, escalating through the default list only as far as needed.
//!
//! # Escalation
//!
//! With `n` defaults the engine makes up to `n + 1` attempts. Attempt `i`
//! seeds the caller's values plus the first `i` defaults and propagates.
//! The first attempt that resolves every relation target wins. A conflict
//! between two derivations of one parameter ends the call immediately at
//! whatever attempt it shows up in, since extra assumptions can never
//! repair a contradiction.
//!
//! # Propagation
//!
//! Each attempt makes at most `1 + relations` passes over the relation
//! list in order. A pass that derives nothing new ends the attempt early:
//! the next pass would see exactly the same assignment.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, instrument, trace};

use crate::assignment::Assignment;
use crate::error::{ConfigError, Error, Result};
use crate::relation::{Op, Relation};
use crate::tolerance::Tolerance;
use crate::types::{Assumption, Completion, ParamId, Parameters, Provenance};

/// A relation with its names resolved to universe indices
#[derive(Debug, Clone)]
struct Resolved {
    op: Op,
    target: usize,
    inputs: Vec<usize>,
    /// Rendered `target = expression`, used for provenance and errors
    describe: String,
}

/// Caller input split into known parameters and pass-through extras
struct Seeds {
    known: Vec<(usize, f64)>,
    extras: Vec<(ParamId, f64)>,
}

/// Result of a single escalation attempt
enum Attempt {
    Complete(Completion),
    Incomplete(Vec<ParamId>),
}

/// Rule-based parameter completion engine.
///
/// The relation table and default list are fixed at construction. The
/// engine keeps no per-call state, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct Consistency {
    relations: Vec<Relation>,
    defaults: Vec<Assumption>,
    tolerance: Tolerance,
    /// Relation targets in first-appearance order, then default-only names
    universe: IndexSet<ParamId>,
    /// Universe indices that some relation targets
    targets: Vec<usize>,
    resolved: Vec<Resolved>,
}

impl Consistency {
    /// Build an engine from a relation table and an ordered default list.
    ///
    /// Every relation input must be the target of some relation or the
    /// name of a default.
    pub fn new(
        relations: Vec<Relation>,
        defaults: Vec<Assumption>,
    ) -> std::result::Result<Self, ConfigError> {
        if relations.is_empty() {
            return Err(ConfigError::EmptyRelationSet);
        }
        for relation in &relations {
            relation.validate()?;
        }

        let mut universe = IndexSet::new();
        for relation in &relations {
            universe.insert(relation.target().clone());
        }
        let targets: Vec<usize> = (0..universe.len()).collect();

        let mut seen = IndexSet::new();
        for default in &defaults {
            if !default.value.is_finite() {
                return Err(ConfigError::NonFiniteDefault {
                    parameter: default.name.clone(),
                    value: default.value,
                });
            }
            if !seen.insert(default.name.clone()) {
                return Err(ConfigError::DuplicateDefault {
                    parameter: default.name.clone(),
                });
            }
            universe.insert(default.name.clone());
        }

        let resolved = relations
            .iter()
            .map(|relation| {
                let inputs = relation
                    .inputs()
                    .iter()
                    .map(|name| {
                        universe
                            .get_index_of(name)
                            .ok_or_else(|| ConfigError::UnknownParameter {
                                relation: relation.describe(),
                                parameter: name.clone(),
                            })
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let target = universe
                    .get_index_of(relation.target())
                    .ok_or_else(|| ConfigError::UnknownParameter {
                        relation: relation.describe(),
                        parameter: relation.target().clone(),
                    })?;
                Ok(Resolved {
                    op: relation.op(),
                    target,
                    inputs,
                    describe: relation.describe(),
                })
            })
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

        debug!(
            relations = relations.len(),
            defaults = defaults.len(),
            parameters = universe.len(),
            "consistency engine built"
        );

        Ok(Self {
            relations,
            defaults,
            tolerance: Tolerance::default(),
            universe,
            targets,
            resolved,
        })
    }

    /// Replace the conflict-detection tolerance
    pub fn with_tolerance(
        mut self,
        tolerance: Tolerance,
    ) -> std::result::Result<Self, ConfigError> {
        tolerance.validate()?;
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn defaults(&self) -> &[Assumption] {
        &self.defaults
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Every parameter name the engine knows about
    pub fn parameters(&self) -> impl Iterator<Item = &ParamId> {
        self.universe.iter()
    }

    /// Names that must all be resolved for a completion to succeed
    pub fn targets(&self) -> impl Iterator<Item = &ParamId> {
        self.targets.iter().filter_map(|&i| self.universe.get_index(i))
    }

    /// Propagation pass budget per escalation attempt
    pub fn max_passes(&self) -> usize {
        1 + self.relations.len()
    }

    /// Complete a partial assignment.
    ///
    /// Tries zero defaults, then successively longer prefixes of the default
    /// list. Fails with [`Error::OverSpecified`] as soon as two derivations
    /// disagree, or with [`Error::UnderSpecified`] once every default has
    /// been tried. The input is never modified.
    #[instrument(skip_all, fields(supplied = partial.len()))]
    pub fn complete(&self, partial: &Parameters) -> Result<Completion> {
        let seeds = self.seed(partial)?;

        let mut unresolved = Vec::new();
        for count in 0..=self.defaults.len() {
            match self.attempt(&seeds, count)? {
                Attempt::Complete(completion) => return Ok(completion),
                Attempt::Incomplete(names) => {
                    debug!(assumptions = count, unresolved = ?names, "model still under-specified");
                    unresolved = names;
                }
            }
        }
        Err(Error::UnderSpecified { unresolved })
    }

    /// Run a single escalation attempt with the first `count` defaults.
    ///
    /// `count` is clamped to the length of the default list. Unlike
    /// [`Consistency::complete`] this does not escalate further.
    pub fn complete_with_assumptions(
        &self,
        partial: &Parameters,
        count: usize,
    ) -> Result<Completion> {
        let seeds = self.seed(partial)?;
        match self.attempt(&seeds, count.min(self.defaults.len()))? {
            Attempt::Complete(completion) => Ok(completion),
            Attempt::Incomplete(unresolved) => Err(Error::UnderSpecified { unresolved }),
        }
    }

    fn seed(&self, partial: &Parameters) -> Result<Seeds> {
        let mut seeds = Seeds {
            known: Vec::with_capacity(partial.len()),
            extras: Vec::new(),
        };
        for (name, &value) in partial {
            if !value.is_finite() {
                return Err(Error::InvalidValue {
                    parameter: name.clone(),
                    value,
                });
            }
            match self.universe.get_index_of(name) {
                Some(index) => seeds.known.push((index, value)),
                None => {
                    trace!(parameter = %name, "not referenced by any relation, passing through");
                    seeds.extras.push((name.clone(), value));
                }
            }
        }
        Ok(seeds)
    }

    fn attempt(&self, seeds: &Seeds, count: usize) -> Result<Attempt> {
        let assumptions = &self.defaults[..count];
        if !assumptions.is_empty() {
            let text: Vec<String> = assumptions.iter().map(ToString::to_string).collect();
            debug!(assumptions = %text.join(", "), "trying assumptions");
        }

        let mut assignment = Assignment::new(self.universe.len());
        for &(index, value) in &seeds.known {
            assignment.supply(index, value);
        }
        for assumption in assumptions {
            if let Some(index) = self.universe.get_index_of(&assumption.name) {
                if !assignment.assume(index, assumption.value) {
                    trace!(parameter = %assumption.name, "already specified, default ignored");
                }
            }
        }

        if !self.propagate(&mut assignment)? {
            let unresolved = assignment
                .unresolved(&self.targets)
                .into_iter()
                .filter_map(|i| self.universe.get_index(i).cloned())
                .collect();
            return Ok(Attempt::Incomplete(unresolved));
        }

        debug!(assumptions = count, "model okay");
        Ok(Attempt::Complete(self.collect(&assignment, seeds, count)))
    }

    /// Apply relations pass by pass. Returns whether every target resolved.
    fn propagate(&self, assignment: &mut Assignment) -> Result<bool> {
        for pass in 0..self.max_passes() {
            let mut progressed = false;
            for resolved in &self.resolved {
                progressed |= self.apply(resolved, assignment)?;
            }
            if assignment.is_resolved(&self.targets) {
                trace!(passes = pass + 1, "all parameters resolved");
                return Ok(true);
            }
            if !progressed {
                trace!(passes = pass + 1, "propagation stalled");
                break;
            }
        }
        Ok(false)
    }

    /// Evaluate one relation. Returns whether it set a new value.
    fn apply(&self, resolved: &Resolved, assignment: &mut Assignment) -> Result<bool> {
        let Some(args) = resolved
            .inputs
            .iter()
            .map(|&i| assignment.get(i).value())
            .collect::<Option<Vec<f64>>>()
        else {
            return Ok(false);
        };

        let value = resolved.op.apply(&args);
        if !value.is_finite() {
            trace!(relation = %resolved.describe, value, "not derivable");
            return Ok(false);
        }

        match assignment.get(resolved.target).value() {
            None => {
                debug!(
                    parameter = %self.universe[resolved.target],
                    value,
                    relation = %resolved.describe,
                    "calculated"
                );
                assignment.derive(resolved.target, value, &resolved.describe);
                Ok(true)
            }
            Some(existing) if self.tolerance.is_close(existing, value) => Ok(false),
            Some(existing) => Err(Error::OverSpecified {
                parameter: self.universe[resolved.target].clone(),
                existing,
                derived: value,
                relation: resolved.describe.clone(),
            }),
        }
    }

    fn collect(&self, assignment: &Assignment, seeds: &Seeds, count: usize) -> Completion {
        let mut parameters = Parameters::with_capacity(self.universe.len() + seeds.extras.len());
        let mut provenance = IndexMap::with_capacity(parameters.capacity());
        for (index, value, source) in assignment.specified() {
            let name = self.universe[index].clone();
            parameters.insert(name.clone(), value);
            provenance.insert(name, source.clone());
        }
        for (name, value) in &seeds.extras {
            parameters.insert(name.clone(), *value);
            provenance.insert(name.clone(), Provenance::Supplied);
        }
        Completion {
            parameters,
            assumptions: count,
            provenance,
        }
    }
}
