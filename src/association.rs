//! Companion-hit association map produced by upstream clustering.
//!
//! Maps a hit to the hits in the opposite view that were judged to come from
//! the same physical cluster. The combiner only reads it.

use crate::types::{Hit, HitId};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct AssociationMap<'h> {
    companions: HashMap<HitId, Vec<&'h Hit>>,
}

impl<'h> AssociationMap<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `companion` for `hit`; repeated companions are ignored.
    pub fn insert(&mut self, hit: HitId, companion: &'h Hit) {
        let entry = self.companions.entry(hit).or_default();
        if !entry.iter().any(|c| c.id == companion.id) {
            entry.push(companion);
        }
    }

    /// Companions of `hit` in insertion order; empty when unknown.
    pub fn companions(&self, hit: HitId) -> &[&'h Hit] {
        self.companions.get(&hit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.companions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }
}
