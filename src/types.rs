use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Global 3-D vector in millimetres.
pub type Vec3 = Vector3<f64>;

/// Opaque hit identity assigned by the upstream producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitId(pub u64);

/// Chamber/station grouping key used by the tight-association check and by
/// callers that need hits per chamber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChamberId(pub u32);

/// Technology of the measurement behind a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum HitKind {
    /// Drift-tube hit, precise in the non-bending coordinate only.
    Mdt,
    /// Strip cluster measuring either the bending (phi) or the eta coordinate.
    Cluster {
        #[serde(rename = "measuresPhi")]
        measures_phi: bool,
    },
}

impl HitKind {
    pub fn measures_phi(&self) -> bool {
        matches!(self, HitKind::Cluster { measures_phi: true })
    }
}

/// A single detector hit. Equality and hashing use the identity only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hit {
    pub id: HitId,
    pub position: Vec3,
    pub chamber: ChamberId,
    pub kind: HitKind,
}

impl Hit {
    pub fn new(id: HitId, position: Vec3, chamber: ChamberId, kind: HitKind) -> Self {
        Self {
            id,
            position,
            chamber,
            kind,
        }
    }

    pub fn measures_phi(&self) -> bool {
        self.kind.measures_phi()
    }
}

impl PartialEq for Hit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Hit {}

impl Hash for Hit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_identity_ignores_position() {
        let a = Hit::new(HitId(7), Vec3::new(1.0, 2.0, 3.0), ChamberId(1), HitKind::Mdt);
        let b = Hit::new(
            HitId(7),
            Vec3::new(-5.0, 0.0, 0.0),
            ChamberId(2),
            HitKind::Cluster { measures_phi: true },
        );
        assert_eq!(a, b);
    }

    #[test]
    fn only_phi_clusters_measure_phi() {
        assert!(!HitKind::Mdt.measures_phi());
        assert!(!HitKind::Cluster { measures_phi: false }.measures_phi());
        assert!(HitKind::Cluster { measures_phi: true }.measures_phi());
    }
}
