use pattern_combiner::angle::unit_direction;
use pattern_combiner::io::{AssociationRecord, EventFile, PatternRecord};
use pattern_combiner::types::{ChamberId, Hit, HitId, HitKind, Vec3};

pub const PHI_CLUSTER: HitKind = HitKind::Cluster { measures_phi: true };

/// Builds an [`EventFile`] from straight rays of hits.
///
/// Hit ids are assigned sequentially from 1; every hit of a ray gets its own
/// chamber starting at `first_chamber`.
pub struct EventBuilder {
    event: EventFile,
    next_id: u64,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            event: EventFile::default(),
            next_id: 1,
        }
    }

    /// Adds one hit per distance along `origin + t · unit(phi, theta)`.
    pub fn ray(
        &mut self,
        origin: Vec3,
        phi: f64,
        theta: f64,
        distances: &[f64],
        kind: HitKind,
        first_chamber: u32,
    ) -> Vec<HitId> {
        let dir = unit_direction(phi, theta);
        distances
            .iter()
            .enumerate()
            .map(|(i, t)| self.hit(origin + dir * *t, kind, first_chamber + i as u32))
            .collect()
    }

    pub fn hit(&mut self, position: Vec3, kind: HitKind, chamber: u32) -> HitId {
        let id = HitId(self.next_id);
        self.next_id += 1;
        self.event
            .hits
            .push(Hit::new(id, position, ChamberId(chamber), kind));
        id
    }

    pub fn eta(&mut self, position: Vec3, phi: f64, theta: f64, hits: &[HitId]) -> &mut Self {
        self.event.eta.push(record(position, phi, theta, hits));
        self
    }

    pub fn phi(&mut self, position: Vec3, phi: f64, theta: f64, hits: &[HitId]) -> &mut Self {
        self.event.phi.push(record(position, phi, theta, hits));
        self
    }

    pub fn associate(&mut self, hit: HitId, companions: &[HitId]) -> &mut Self {
        self.event.association.push(AssociationRecord {
            hit,
            companions: companions.to_vec(),
        });
        self
    }

    pub fn build(self) -> EventFile {
        self.event
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn record(position: Vec3, phi: f64, theta: f64, hits: &[HitId]) -> PatternRecord {
    PatternRecord {
        position,
        direction: unit_direction(phi, theta),
        hits: hits.to_vec(),
    }
}
