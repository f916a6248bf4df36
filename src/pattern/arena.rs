//! Call-scoped owner of every pattern touched by one combination call.
//!
//! Inputs are copied in at the start of a call and every derived pattern is
//! appended; nothing is ever removed or mutated. Handles stay valid for the
//! lifetime of the arena, which ends when the call returns.

use super::Pattern;
use std::fmt;
use std::ops::Index;

/// Dense handle into a [`PatternArena`], ordered by insertion.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u32);

impl PatternId {
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only pattern storage.
#[derive(Debug, Default)]
pub struct PatternArena<'h> {
    patterns: Vec<Pattern<'h>>,
}

impl<'h> PatternArena<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            patterns: Vec::with_capacity(capacity),
        }
    }

    /// Stores `pattern` and returns its handle.
    pub fn insert(&mut self, pattern: Pattern<'h>) -> PatternId {
        let id = PatternId(self.patterns.len() as u32);
        self.patterns.push(pattern);
        id
    }

    /// Copies a slice of input patterns in order and returns their handles.
    pub fn insert_all(&mut self, patterns: &[Pattern<'h>]) -> Vec<PatternId> {
        patterns.iter().map(|p| self.insert(p.clone())).collect()
    }

    pub fn get(&self, id: PatternId) -> &Pattern<'h> {
        &self.patterns[id.index()]
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<'h> Index<PatternId> for PatternArena<'h> {
    type Output = Pattern<'h>;

    fn index(&self, id: PatternId) -> &Self::Output {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn handles_follow_insertion_order() {
        let mut arena = PatternArena::new();
        let a = arena.insert(Pattern::new(Vec3::zeros(), Vec3::x(), std::iter::empty()));
        let b = arena.insert(Pattern::new(Vec3::zeros(), Vec3::y(), std::iter::empty()));
        assert!(a < b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[b].direction(), &Vec3::y());
    }

    #[test]
    fn insert_all_preserves_order() {
        let inputs = vec![
            Pattern::new(Vec3::zeros(), Vec3::x(), std::iter::empty()),
            Pattern::new(Vec3::zeros(), Vec3::z(), std::iter::empty()),
        ];
        let mut arena = PatternArena::with_capacity(4);
        let ids = arena.insert_all(&inputs);
        assert_eq!(ids.len(), 2);
        assert_eq!(arena[ids[1]].direction(), &Vec3::z());
    }
}
