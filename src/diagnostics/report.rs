use crate::diagnostics::{CleanStage, DedupStage, MatchStage};
use serde::Serialize;

/// Sizes of the inputs of one combination call.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub eta_patterns: usize,
    pub phi_patterns: usize,
    pub associated_hits: usize,
    pub cosmics: bool,
}

/// Wall-clock milliseconds spent in each stage of a call.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTimings {
    pub match_ms: f64,
    pub dedup_ms: f64,
    pub output_ms: f64,
    pub total_ms: f64,
}

/// End-to-end trace of a combination call.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineReport {
    pub input: InputDescriptor,
    pub matching: MatchStage,
    pub dedup: DedupStage,
    pub clean: CleanStage,
    pub timings: StageTimings,
}

impl CombineReport {
    pub fn print_text_summary(&self) {
        let m = &self.matching;
        println!("Pattern combination summary");
        println!(
            "  inputs: eta={} phi={} associated_hits={} cosmics={}",
            self.input.eta_patterns,
            self.input.phi_patterns,
            self.input.associated_hits,
            self.input.cosmics
        );
        println!(
            "  matching: pairs={} accepted={} rejected(angle={} proximity={} residual={} tight={})",
            m.pairs_evaluated,
            m.accepted_pairs,
            m.angle_rejections,
            m.proximity_rejections,
            m.residual_rejections,
            m.tight_association_rejections
        );
        println!(
            "  cosmics: refits={} refit_rejected={} splits={} dropped_legs={}",
            m.refits_applied, m.refits_rejected, m.splits, m.dropped_legs
        );
        println!(
            "  unmatched: association={} (discarded {}) fallback={} standalone={}",
            m.association_patterns, m.association_discarded, m.fallbacks, m.standalone
        );
        println!(
            "  candidates: {} -> {} after dedup ({} contained)",
            self.dedup.before,
            self.dedup.after,
            self.dedup.removed()
        );
        println!(
            "  cleaning: {} -> {} patterns, {} hits removed, {} emptied",
            self.clean.patterns_in,
            self.clean.patterns_out,
            self.clean.hits_removed,
            self.clean.emptied
        );
        let t = &self.timings;
        println!(
            "  timings: match={:.3} ms dedup={:.3} ms output={:.3} ms total={:.3} ms",
            t.match_ms, t.dedup_ms, t.output_ms, t.total_ms
        );
    }
}
