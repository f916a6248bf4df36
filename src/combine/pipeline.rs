use super::clean::PatternCleaner;
use super::dedup::deduplicate;
use super::matcher::Matcher;
use super::output::{CombinedPattern, OutputBuilder};
use super::params::CombineParams;
use crate::association::AssociationMap;
use crate::diagnostics::{CombineReport, InputDescriptor};
use crate::error::CombineError;
use crate::pattern::{Pattern, PatternArena};
use log::debug;
use std::time::Instant;

/// Combines eta and phi patterns of one event into roads.
///
/// The combiner holds only configuration; all per-event state lives in the
/// call, so one instance can serve any number of events.
#[derive(Clone, Debug, Default)]
pub struct PatternCombiner {
    params: CombineParams,
}

impl PatternCombiner {
    pub fn new(params: CombineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CombineParams {
        &self.params
    }

    pub fn combine<'h>(
        &self,
        eta: &[Pattern<'h>],
        phi: &[Pattern<'h>],
        association: &AssociationMap<'h>,
    ) -> Result<Vec<CombinedPattern<'h>>, CombineError> {
        self.combine_with_report(eta, phi, association)
            .map(|(patterns, _)| patterns)
    }

    /// Like [`combine`](Self::combine), with per-stage counters and timings.
    pub fn combine_with_report<'h>(
        &self,
        eta: &[Pattern<'h>],
        phi: &[Pattern<'h>],
        association: &AssociationMap<'h>,
    ) -> Result<(Vec<CombinedPattern<'h>>, CombineReport), CombineError> {
        let total_start = Instant::now();
        let mut report = CombineReport {
            input: InputDescriptor {
                eta_patterns: eta.len(),
                phi_patterns: phi.len(),
                associated_hits: association.len(),
                cosmics: self.params.use_cosmics,
            },
            ..Default::default()
        };

        let mut arena = PatternArena::with_capacity(2 * (eta.len() + phi.len()));
        let eta_ids = arena.insert_all(eta);
        let phi_ids = arena.insert_all(phi);

        let match_start = Instant::now();
        let matcher = Matcher::new(&self.params, association);
        let candidates = matcher.match_all(&eta_ids, &phi_ids, &mut arena, &mut report.matching);
        report.timings.match_ms = elapsed_ms(match_start);

        let dedup_start = Instant::now();
        report.dedup.before = candidates.len();
        let survivors = deduplicate(&candidates, &arena);
        report.dedup.after = survivors.len();
        report.timings.dedup_ms = elapsed_ms(dedup_start);

        let output_start = Instant::now();
        let builder = OutputBuilder::new(PatternCleaner::new(&self.params.clean));
        let combined = builder.build(&survivors, &arena, &mut report.clean)?;
        report.timings.output_ms = elapsed_ms(output_start);

        report.timings.total_ms = elapsed_ms(total_start);
        debug!(
            "combine: {} eta + {} phi -> {} candidates, {} after dedup, {} published ({} arena patterns)",
            eta.len(),
            phi.len(),
            candidates.len(),
            survivors.len(),
            combined.len(),
            arena.len()
        );
        Ok((combined, report))
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
