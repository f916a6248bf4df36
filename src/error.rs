use crate::types::HitId;
use std::path::PathBuf;

/// Fatal conditions raised by the combiner core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombineError {
    /// The cleaner must never grow a pattern between iterations.
    #[error("pattern cleaner grew a pattern from {before} to {after} hits at iteration {iteration}")]
    CleanerGrewPattern {
        before: usize,
        after: usize,
        iteration: usize,
    },
}

/// Errors raised while loading runtime configuration or event files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize JSON for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context} refers to unknown hit {hit:?}")]
    UnknownHit { hit: HitId, context: String },
    #[error("duplicate hit id {0:?} in event")]
    DuplicateHit(HitId),
}
