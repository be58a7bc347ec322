//! Dispensed-counts record.
//!
//! One match resolution produces one record: how many tiles of each
//! medication were cleared. The patient side consumes each record once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tile::Medication;

/// Per-medication tally of cleared tiles.
///
/// Backed by a `BTreeMap` so iteration follows the medication order and is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispenseRecord {
    counts: BTreeMap<Medication, u32>,
}

impl DispenseRecord {
    /// An empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` units of `med`. Zero amounts are not stored.
    pub fn add(&mut self, med: Medication, amount: u32) {
        if amount > 0 {
            *self.counts.entry(med).or_insert(0) += amount;
        }
    }

    /// Units of `med` in this record.
    #[must_use]
    pub fn get(&self, med: Medication) -> u32 {
        self.counts.get(&med).copied().unwrap_or(0)
    }

    /// Fold another record into this one.
    pub fn merge(&mut self, other: &DispenseRecord) {
        for (med, amount) in other.iter() {
            self.add(med, amount);
        }
    }

    /// Iterate `(medication, amount)` in medication order.
    pub fn iter(&self) -> impl Iterator<Item = (Medication, u32)> + '_ {
        self.counts.iter().map(|(med, amount)| (*med, *amount))
    }

    /// Total units across all medications.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// True when nothing was dispensed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(Medication, u32)> for DispenseRecord {
    fn from_iter<I: IntoIterator<Item = (Medication, u32)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (med, amount) in iter {
            record.add(med, amount);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates() {
        let mut a: DispenseRecord = [(Medication::Tablix, 3)].into_iter().collect();
        let b: DispenseRecord = [(Medication::Tablix, 2), (Medication::Gelux, 4)]
            .into_iter()
            .collect();
        a.merge(&b);
        assert_eq!(a.get(Medication::Tablix), 5);
        assert_eq!(a.get(Medication::Gelux), 4);
        assert_eq!(a.total(), 9);
    }

    #[test]
    fn test_zero_amounts_are_dropped() {
        let mut record = DispenseRecord::new();
        record.add(Medication::Injecta, 0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let record: DispenseRecord = [(Medication::Syrupix, 3)].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Syrupix":3}"#);
    }
}
