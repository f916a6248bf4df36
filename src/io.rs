//! JSON event files and report output.
//!
//! An event file owns its hits; patterns and association entries refer to
//! them by id. [`EventFile::resolve`] turns the file into the borrowed inputs
//! of [`crate::PatternCombiner::combine`].

use crate::association::AssociationMap;
use crate::error::ConfigError;
use crate::pattern::Pattern;
use crate::types::{Hit, HitId, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Pattern as stored on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRecord {
    pub position: Vec3,
    pub direction: Vec3,
    pub hits: Vec<HitId>,
}

/// Companions of one hit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub hit: HitId,
    pub companions: Vec<HitId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventFile {
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub eta: Vec<PatternRecord>,
    #[serde(default)]
    pub phi: Vec<PatternRecord>,
    #[serde(default)]
    pub association: Vec<AssociationRecord>,
}

/// Combiner inputs borrowing the hits of an [`EventFile`].
#[derive(Clone, Debug)]
pub struct ResolvedEvent<'h> {
    pub eta: Vec<Pattern<'h>>,
    pub phi: Vec<Pattern<'h>>,
    pub association: AssociationMap<'h>,
}

impl EventFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks every hit reference and builds the borrowed inputs.
    pub fn resolve(&self) -> Result<ResolvedEvent<'_>, ConfigError> {
        let mut by_id: HitIndex<'_> = HashMap::with_capacity(self.hits.len());
        for hit in &self.hits {
            if by_id.insert(hit.id, hit).is_some() {
                return Err(ConfigError::DuplicateHit(hit.id));
            }
        }
        let eta = resolve_patterns(&self.eta, "eta", &by_id)?;
        let phi = resolve_patterns(&self.phi, "phi", &by_id)?;

        let mut association = AssociationMap::new();
        for record in &self.association {
            lookup(&by_id, record.hit, || "association key".to_string())?;
            for id in &record.companions {
                let companion = lookup(&by_id, *id, || {
                    format!("association of hit {}", record.hit.0)
                })?;
                association.insert(record.hit, companion);
            }
        }

        Ok(ResolvedEvent {
            eta,
            phi,
            association,
        })
    }
}

type HitIndex<'h> = HashMap<HitId, &'h Hit>;

fn lookup<'h>(
    by_id: &HitIndex<'h>,
    id: HitId,
    context: impl FnOnce() -> String,
) -> Result<&'h Hit, ConfigError> {
    by_id.get(&id).copied().ok_or_else(|| ConfigError::UnknownHit {
        hit: id,
        context: context(),
    })
}

fn resolve_patterns<'h>(
    records: &[PatternRecord],
    view: &str,
    by_id: &HitIndex<'h>,
) -> Result<Vec<Pattern<'h>>, ConfigError> {
    let mut patterns = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let mut hits = Vec::with_capacity(record.hits.len());
        for id in &record.hits {
            hits.push(lookup(by_id, *id, || format!("{view} pattern {i}"))?);
        }
        patterns.push(Pattern::new(record.position, record.direction, hits));
    }
    Ok(patterns)
}

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "hits": [
            { "id": 1, "position": [5000.0, 0.0, 3000.0], "chamber": 4, "kind": { "type": "mdt" } },
            { "id": 2, "position": [6000.0, 10.0, 3600.0], "chamber": 5, "kind": { "type": "mdt" } },
            { "id": 7, "position": [5500.0, 60.0, 3300.0], "chamber": 4,
              "kind": { "type": "cluster", "measuresPhi": true } }
        ],
        "eta": [ { "position": [0.0, 0.0, 0.0], "direction": [0.84, 0.0, 0.54], "hits": [1, 2] } ],
        "phi": [ { "position": [0.0, 0.0, 0.0], "direction": [0.84, 0.02, 0.54], "hits": [7] } ],
        "association": [ { "hit": 1, "companions": [7] } ]
    }"#;

    #[test]
    fn event_resolves_to_borrowed_inputs() {
        let event: EventFile = serde_json::from_str(EVENT).expect("event");
        let resolved = event.resolve().expect("resolve");
        assert_eq!(resolved.eta.len(), 1);
        assert_eq!(resolved.eta[0].len(), 2);
        assert!(resolved.phi[0].hits()[0].measures_phi());
        assert_eq!(resolved.association.companions(HitId(1))[0].id, HitId(7));
    }

    #[test]
    fn unknown_hit_reference_is_reported() {
        let mut event: EventFile = serde_json::from_str(EVENT).expect("event");
        event.phi[0].hits.push(HitId(99));
        match event.resolve() {
            Err(ConfigError::UnknownHit { hit, context }) => {
                assert_eq!(hit, HitId(99));
                assert_eq!(context, "phi pattern 0");
            }
            other => panic!("expected unknown hit, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_hit_ids_are_rejected() {
        let mut event: EventFile = serde_json::from_str(EVENT).expect("event");
        let copy = event.hits[0].clone();
        event.hits.push(copy);
        assert!(matches!(event.resolve(), Err(ConfigError::DuplicateHit(HitId(1)))));
    }
}
