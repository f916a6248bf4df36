//! Splitting of roads that cross the detector centre.
//!
//! A cosmic muon traverses the whole detector; downstream segment finding wants
//! it as two rays starting near the centre. A road whose line crosses the
//! reference cylinder (the calorimeter envelope) is split into two patterns
//! sharing the original position. Hits are assigned by the sign of their
//! projection on the road direction.

use super::params::SplitParams;
use crate::angle::{flipped, unit_direction};
use crate::geometry::ReferenceCylinder;
use crate::pattern::Pattern;
use crate::types::{Hit, Vec3};

/// Two legs of a split eta/phi pair.
#[derive(Clone, Debug)]
pub struct SplitLeg<'h> {
    pub eta: Pattern<'h>,
    pub phi: Pattern<'h>,
}

pub struct PatternSplitter {
    cylinder: ReferenceCylinder,
    flip_direction: bool,
}

impl PatternSplitter {
    pub fn new(params: &SplitParams, flip_direction: bool) -> Self {
        Self {
            cylinder: ReferenceCylinder {
                radius: params.cylinder_radius,
                half_length: params.cylinder_half_length,
            },
            flip_direction,
        }
    }

    /// Whether the line of `pattern` crosses the reference cylinder.
    pub fn crosses(&self, pattern: &Pattern<'_>) -> bool {
        self.cylinder
            .intersects(pattern.position(), &pattern.unit_direction())
    }

    /// Splits a single pattern; `None` when its line misses the cylinder.
    /// The two halves partition the hit set.
    pub fn split<'h>(&self, pattern: &Pattern<'h>) -> Option<[Pattern<'h>; 2]> {
        if !self.crosses(pattern) {
            return None;
        }
        let (phi, theta) = (pattern.phi(), pattern.theta());
        Some(self.split_along(pattern, phi, theta))
    }

    /// Splits an eta/phi pair along the eta road so both views stay paired:
    /// leg 0 holds the hits ahead of the origin, leg 1 those behind.
    pub fn split_pair<'h>(
        &self,
        eta: &Pattern<'h>,
        phi: &Pattern<'h>,
    ) -> Option<[SplitLeg<'h>; 2]> {
        if !self.crosses(eta) {
            return None;
        }
        let (road_phi, road_theta) = (eta.phi(), eta.theta());
        let [eta_a, eta_b] = self.split_along(eta, road_phi, road_theta);
        let [phi_a, phi_b] = self.split_along(phi, road_phi, road_theta);
        Some([
            SplitLeg {
                eta: eta_a,
                phi: phi_a,
            },
            SplitLeg {
                eta: eta_b,
                phi: phi_b,
            },
        ])
    }

    fn split_along<'h>(&self, pattern: &Pattern<'h>, phi: f64, theta: f64) -> [Pattern<'h>; 2] {
        let d1 = unit_direction(phi, theta);
        let scale = pattern.curvature_scale();
        let d2 = if self.flip_direction {
            let (fphi, ftheta) = flipped(phi, theta);
            unit_direction(fphi, ftheta)
        } else {
            d1
        };
        let (ahead, behind): (Vec<&'h Hit>, Vec<&'h Hit>) = pattern
            .hits()
            .iter()
            .partition(|h| h.position.dot(&d1) >= 0.0);
        let position: Vec3 = *pattern.position();
        [
            Pattern::new(position, d1 * scale, ahead),
            Pattern::new(position, d2 * scale, behind),
        ]
    }
}
