//! Per-call parameter storage
//!
//! Slots are indexed by the engine's parameter universe. An assignment is
//! created for one escalation level of one call and dropped afterwards.

use crate::types::{Provenance, Slot};

#[derive(Debug, Clone)]
pub(crate) struct Assignment {
    slots: Vec<Slot>,
    provenance: Vec<Option<Provenance>>,
}

impl Assignment {
    /// Every slot unspecified
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Slot::Unspecified; len],
            provenance: vec![None; len],
        }
    }

    pub fn get(&self, index: usize) -> Slot {
        self.slots[index]
    }

    /// Record a caller value
    pub fn supply(&mut self, index: usize, value: f64) {
        self.slots[index] = Slot::Specified(value);
        self.provenance[index] = Some(Provenance::Supplied);
    }

    /// Record a default, unless the slot already holds a value.
    ///
    /// Returns whether the default was used.
    pub fn assume(&mut self, index: usize, value: f64) -> bool {
        if self.slots[index].is_specified() {
            return false;
        }
        self.slots[index] = Slot::Specified(value);
        self.provenance[index] = Some(Provenance::Assumed);
        true
    }

    /// Record a value computed by a relation
    pub fn derive(&mut self, index: usize, value: f64, relation: &str) {
        self.slots[index] = Slot::Specified(value);
        self.provenance[index] = Some(Provenance::Derived {
            relation: relation.to_string(),
        });
    }

    /// Indices among `indices` that are still unspecified, in order
    pub fn unresolved(&self, indices: &[usize]) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|&i| !self.slots[i].is_specified())
            .collect()
    }

    pub fn is_resolved(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&i| self.slots[i].is_specified())
    }

    /// Specified slots with their provenance, in index order
    pub fn specified(&self) -> impl Iterator<Item = (usize, f64, &Provenance)> + '_ {
        self.slots
            .iter()
            .zip(&self.provenance)
            .enumerate()
            .filter_map(|(i, (slot, source))| Some((i, slot.value()?, source.as_ref()?)))
    }
}
