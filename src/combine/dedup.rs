//! Removal of candidates whose hits are contained in another candidate.
//!
//! A candidate is dropped when both its eta and its phi hit sets are subsets of
//! another candidate's. Among exact duplicates the earliest survives. Hit sets
//! are built once per candidate so each subset test is linear in the hits.

use super::candidate::Candidate;
use crate::pattern::PatternArena;
use crate::types::HitId;
use std::collections::HashSet;

struct CandidateHits {
    eta: HashSet<HitId>,
    phi: HashSet<HitId>,
}

impl CandidateHits {
    fn contained_in(&self, other: &CandidateHits) -> bool {
        self.eta.len() <= other.eta.len()
            && self.phi.len() <= other.phi.len()
            && self.eta.is_subset(&other.eta)
            && self.phi.is_subset(&other.phi)
    }

    fn same_as(&self, other: &CandidateHits) -> bool {
        self.eta == other.eta && self.phi == other.phi
    }
}

/// Returns the surviving candidates in their original order.
pub fn deduplicate(candidates: &[Candidate], arena: &PatternArena<'_>) -> Vec<Candidate> {
    let hits: Vec<CandidateHits> = candidates
        .iter()
        .map(|c| CandidateHits {
            eta: arena[c.eta].hit_ids(),
            phi: c.phi.map(|id| arena[id].hit_ids()).unwrap_or_default(),
        })
        .collect();

    candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let mine = &hits[*i];
            !hits.iter().enumerate().any(|(j, other)| {
                if j == *i || !mine.contained_in(other) {
                    return false;
                }
                // Exact duplicates: only the later one goes.
                !mine.same_as(other) || j < *i
            })
        })
        .map(|(_, c)| *c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Pattern, PatternId};
    use crate::types::{ChamberId, Hit, HitKind, Vec3};

    fn hits(n: u64) -> Vec<Hit> {
        (0..n)
            .map(|i| Hit::new(HitId(i), Vec3::new(i as f64, 0.0, 0.0), ChamberId(0), HitKind::Mdt))
            .collect()
    }

    fn add<'h>(arena: &mut PatternArena<'h>, hits: &'h [Hit], ids: &[usize]) -> PatternId {
        arena.insert(Pattern::new(
            Vec3::zeros(),
            Vec3::x(),
            ids.iter().map(|i| &hits[*i]),
        ))
    }

    #[test]
    fn equal_candidates_collapse_to_first() {
        let pool = hits(6);
        let mut arena = PatternArena::new();
        let eta_a = add(&mut arena, &pool, &[0, 1, 2]);
        let eta_b = add(&mut arena, &pool, &[2, 1, 0]);
        let phi_a = add(&mut arena, &pool, &[3, 4]);
        let phi_b = add(&mut arena, &pool, &[4, 3]);
        let candidates = vec![
            Candidate::new(eta_a, Some(phi_a)),
            Candidate::new(eta_b, Some(phi_b)),
            Candidate::new(eta_a, Some(phi_b)),
        ];
        let kept = deduplicate(&candidates, &arena);
        assert_eq!(kept, vec![candidates[0]]);
        assert_eq!(deduplicate(&kept, &arena), kept);
    }

    #[test]
    fn subset_needs_both_views() {
        let pool = hits(8);
        let mut arena = PatternArena::new();
        let big_eta = add(&mut arena, &pool, &[0, 1, 2, 3]);
        let small_eta = add(&mut arena, &pool, &[1, 2]);
        let phi_small = add(&mut arena, &pool, &[5]);
        let phi_other = add(&mut arena, &pool, &[6, 7]);
        let candidates = vec![
            Candidate::new(big_eta, Some(phi_small)),
            // eta subset but phi not a subset: survives
            Candidate::new(small_eta, Some(phi_other)),
            // eta subset and missing phi: dropped
            Candidate::new(small_eta, None),
        ];
        let kept = deduplicate(&candidates, &arena);
        assert_eq!(kept, vec![candidates[0], candidates[1]]);
    }

    #[test]
    fn strict_subset_is_dropped_even_when_earlier() {
        let pool = hits(6);
        let mut arena = PatternArena::new();
        let small = add(&mut arena, &pool, &[0, 1]);
        let big = add(&mut arena, &pool, &[0, 1, 2]);
        let phi = add(&mut arena, &pool, &[4]);
        let candidates = vec![Candidate::new(small, Some(phi)), Candidate::new(big, Some(phi))];
        let kept = deduplicate(&candidates, &arena);
        assert_eq!(kept, vec![candidates[1]]);
    }
}
