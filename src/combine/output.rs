//! Materialisation of surviving candidates into owned output patterns.
//!
//! A candidate with a phi partner becomes one road built from the phi
//! pattern's bending-plane parameters and the eta pattern's `(s, z)`
//! parameters; a standalone eta pattern is taken as is. Every road is cleaned
//! before it is published and roads left without hits are dropped.

use super::candidate::Candidate;
use super::clean::PatternCleaner;
use crate::diagnostics::CleanStage;
use crate::error::CombineError;
use crate::pattern::{LineParameters, Pattern, PatternArena};
use crate::types::{ChamberId, Hit, Vec3};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final combined road. Hits stay borrowed from the caller.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedPattern<'h> {
    pub position: Vec3,
    pub direction: Vec3,
    pub hits: Vec<&'h Hit>,
    pub has_phi: bool,
}

impl<'h> CombinedPattern<'h> {
    fn from_pattern(pattern: Pattern<'h>, has_phi: bool) -> Self {
        Self {
            position: *pattern.position(),
            direction: *pattern.direction(),
            hits: pattern.hits().to_vec(),
            has_phi,
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits grouped per chamber, in hit order within each chamber.
    pub fn hits_by_chamber(&self) -> BTreeMap<ChamberId, Vec<&'h Hit>> {
        let mut grouped: BTreeMap<ChamberId, Vec<&'h Hit>> = BTreeMap::new();
        for hit in &self.hits {
            grouped.entry(hit.chamber).or_default().push(*hit);
        }
        grouped
    }
}

pub struct OutputBuilder<'a> {
    cleaner: PatternCleaner<'a>,
}

impl<'a> OutputBuilder<'a> {
    pub fn new(cleaner: PatternCleaner<'a>) -> Self {
        Self { cleaner }
    }

    /// Builds, cleans and publishes every candidate in order.
    pub fn build<'h>(
        &self,
        candidates: &[Candidate],
        arena: &PatternArena<'h>,
        stats: &mut CleanStage,
    ) -> Result<Vec<CombinedPattern<'h>>, CombineError> {
        let mut out = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let road = assemble(candidate, arena);
            stats.patterns_in += 1;
            let cleaned = self.cleaner.clean(&road)?;
            stats.hits_removed += cleaned.removed;
            stats.max_iterations = stats.max_iterations.max(cleaned.iterations);
            if cleaned.pattern.is_empty() {
                stats.emptied += 1;
                debug!(
                    "output: road of eta {} lost all {} hits in cleaning, dropped",
                    candidate.eta,
                    road.len()
                );
                continue;
            }
            stats.patterns_out += 1;
            out.push(CombinedPattern::from_pattern(cleaned.pattern, candidate.has_phi()));
        }
        Ok(out)
    }
}

/// Uncleaned road of a candidate: eta hits first, then phi hits.
fn assemble<'h>(candidate: &Candidate, arena: &PatternArena<'h>) -> Pattern<'h> {
    let eta = &arena[candidate.eta];
    match candidate.phi {
        None => eta.clone(),
        Some(phi_id) => {
            let phi = &arena[phi_id];
            let xy = phi.xy_line();
            let rz = eta.rz_line();
            let params = LineParameters {
                r0: xy.r0,
                phi: xy.phi,
                rz0: rz.rz0,
                theta: rz.theta,
            };
            let hits = eta.hits().iter().chain(phi.hits()).copied();
            Pattern::from_parameters(&params, eta.curvature_scale(), hits)
        }
    }
}
