#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod association;
pub mod combine;
pub mod diagnostics;
pub mod error;
pub mod pattern;
pub mod types;

// Geometry helpers and tool plumbing.
pub mod angle;
pub mod config;
pub mod geometry;
pub mod io;

// --- High-level re-exports -------------------------------------------------

// Main entry points: combiner + results.
pub use crate::combine::{CombineParams, CombinedPattern, PatternCombiner};
pub use crate::error::{CombineError, ConfigError};

// High-level diagnostics returned by the combiner.
pub use crate::diagnostics::CombineReport;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use pattern_combiner::prelude::*;
///
/// # fn main() -> Result<(), CombineError> {
/// let hits = vec![
///     Hit::new(HitId(1), Vec3::new(5000.0, 0.0, 3000.0), ChamberId(1), HitKind::Mdt),
///     Hit::new(HitId(2), Vec3::new(7000.0, 0.0, 4200.0), ChamberId(2), HitKind::Mdt),
/// ];
/// let eta = vec![Pattern::new(Vec3::zeros(), Vec3::new(0.86, 0.0, 0.51), hits.iter())];
///
/// let combiner = PatternCombiner::new(CombineParams::default());
/// let roads = combiner.combine(&eta, &[], &AssociationMap::new())?;
/// println!("roads={} has_phi={}", roads.len(), roads[0].has_phi);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::association::AssociationMap;
    pub use crate::pattern::Pattern;
    pub use crate::types::{ChamberId, Hit, HitId, HitKind, Vec3};
    pub use crate::{CombineError, CombineParams, CombinedPattern, PatternCombiner};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::combine::{
        deduplicate, Candidate, Matcher, OutputBuilder, ParameterRefiner, PatternCleaner,
        PatternSplitter,
    };
    pub use crate::pattern::{LineParameters, PatternArena, PatternId};

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        CleanStage, DedupStage, InputDescriptor, MatchStage, StageTimings,
    };
}
