use serde::Serialize;

/// Counters collected by the eta/phi matcher.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStage {
    pub eta_patterns: usize,
    pub phi_patterns: usize,
    pub skipped_empty_eta: usize,
    pub pairs_evaluated: usize,
    pub angle_rejections: usize,
    pub proximity_rejections: usize,
    pub residual_rejections: usize,
    pub tight_association_rejections: usize,
    pub accepted_pairs: usize,
    pub refits_applied: usize,
    pub refits_rejected: usize,
    pub splits: usize,
    pub dropped_legs: usize,
    pub association_patterns: usize,
    pub association_discarded: usize,
    pub fallbacks: usize,
    pub standalone: usize,
    pub candidates: usize,
}

/// Candidate counts around duplicate removal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupStage {
    pub before: usize,
    pub after: usize,
}

impl DedupStage {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Counters collected while materialising and cleaning the output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanStage {
    pub patterns_in: usize,
    pub patterns_out: usize,
    pub hits_removed: usize,
    pub max_iterations: usize,
    pub emptied: usize,
}
