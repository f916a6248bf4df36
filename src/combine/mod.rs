//! Eta/phi pattern combination.
//!
//! Pipeline of one call:
//! 1. matching: every eta pattern is paired with compatible phi patterns
//!    ([`matcher`]), refitting the road in cosmic mode ([`refit`]) and
//!    optionally splitting roads through the detector centre ([`split`]);
//! 2. deduplication of candidates contained in another ([`dedup`]);
//! 3. output: combined roads are built and cleaned of incompatible hits
//!    ([`output`], [`clean`]).
//!
//! Entry point: [`PatternCombiner`].

pub mod candidate;
pub mod clean;
pub mod dedup;
pub mod matcher;
pub mod output;
pub mod params;
pub mod pipeline;
pub mod refit;
pub mod split;

pub use candidate::Candidate;
pub use clean::{CleanResult, PatternCleaner};
pub use dedup::deduplicate;
pub use matcher::Matcher;
pub use output::{CombinedPattern, OutputBuilder};
pub use params::{
    CleanParams, CombineParams, MatchParams, ProximityTest, RefitParams, ResidualProjection,
    RunMode, SplitParams,
};
pub use pipeline::PatternCombiner;
pub use refit::{ParameterRefiner, RefitOutcome, RefitRejection};
pub use split::{PatternSplitter, SplitLeg};
