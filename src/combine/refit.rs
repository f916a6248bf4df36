//! Line parameter re-estimation for roads that do not point to the origin.
//!
//! The 2-D pattern finders assume tracks from the interaction point, which is
//! wrong for cosmics. The refiner pools the hits of an eta/phi pair and
//! re-estimates `(r0, φ)` in the bending plane, then `(rz0, θ)` in the `(s, z)`
//! plane with `s` measured along the new φ.
//!
//! Each pass computes an inverse-variance weighted centroid, splits the hits
//! into the two halves on either side of it along the current direction, and
//! takes the direction of the weighted, sign-corrected sum of offsets. The
//! update is refused when the hits span less than the minimum lever arm or the
//! sum vanishes; the previous parameters are then kept.

use super::params::RefitParams;
use crate::geometry::along_xy;
use crate::pattern::LineParameters;
use crate::types::Hit;
use log::debug;
use std::collections::HashSet;

/// Which coordinate a hit measures precisely in a given projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Projection {
    Xy,
    Rz,
}

#[derive(Clone, Copy, Debug)]
struct WeightedPoint {
    pos: [f64; 2],
    weight: f64,
}

/// Why a refit pass kept the previous parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RefitRejection {
    NoHits,
    ShortLeverArm { lever_arm: f64 },
    DegenerateSum,
}

#[derive(Clone, Copy, Debug)]
struct Accumulation {
    centroid: [f64; 2],
    sum: [f64; 2],
}

/// Result of [`ParameterRefiner::refit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefitOutcome {
    pub parameters: LineParameters,
    pub xy: Result<(), RefitRejection>,
    pub rz: Result<(), RefitRejection>,
}

impl RefitOutcome {
    pub fn any_update(&self) -> bool {
        self.xy.is_ok() || self.rz.is_ok()
    }
}

pub struct ParameterRefiner<'a> {
    params: &'a RefitParams,
}

impl<'a> ParameterRefiner<'a> {
    pub fn new(params: &'a RefitParams) -> Self {
        Self { params }
    }

    /// Re-estimates both projections from the pooled `hits`, starting from
    /// `initial`. Repeated hit ids are counted once.
    pub fn refit<'h, I>(&self, initial: LineParameters, hits: I) -> RefitOutcome
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        let mut seen = HashSet::new();
        let pooled: Vec<&Hit> = hits.into_iter().filter(|h| seen.insert(h.id)).collect();
        let mut parameters = initial;

        let xy_points: Vec<WeightedPoint> = pooled
            .iter()
            .map(|h| WeightedPoint {
                pos: [h.position.x, h.position.y],
                weight: self.weight(h, Projection::Xy),
            })
            .collect();
        let xy = self
            .accumulate(&xy_points, [parameters.phi.cos(), parameters.phi.sin()])
            .map(|acc| {
                let phi = acc.sum[1].atan2(acc.sum[0]);
                let (sin_phi, cos_phi) = phi.sin_cos();
                parameters.phi = phi;
                parameters.r0 = acc.centroid[0] * sin_phi - acc.centroid[1] * cos_phi;
            });

        let rz_points: Vec<WeightedPoint> = pooled
            .iter()
            .map(|h| WeightedPoint {
                pos: [along_xy(&h.position, parameters.phi), h.position.z],
                weight: self.weight(h, Projection::Rz),
            })
            .collect();
        let rz = self
            .accumulate(&rz_points, [parameters.theta.sin(), parameters.theta.cos()])
            .map(|acc| {
                // Keep θ in [0, π]: the antiparallel sum describes the same line.
                let (sum_s, sum_z) = if acc.sum[0] < 0.0 {
                    (-acc.sum[0], -acc.sum[1])
                } else {
                    (acc.sum[0], acc.sum[1])
                };
                let theta = sum_s.atan2(sum_z);
                let (sin_theta, cos_theta) = theta.sin_cos();
                parameters.theta = theta;
                parameters.rz0 = acc.centroid[0] * cos_theta - acc.centroid[1] * sin_theta;
            });

        if let Err(reason) = xy {
            debug!("refit: keeping (r0, phi) = ({:.1}, {:.4}): {:?}", initial.r0, initial.phi, reason);
        }
        if let Err(reason) = rz {
            debug!(
                "refit: keeping (rz0, theta) = ({:.1}, {:.4}): {:?}",
                parameters.rz0, parameters.theta, reason
            );
        }
        RefitOutcome { parameters, xy, rz }
    }

    fn weight(&self, hit: &Hit, projection: Projection) -> f64 {
        let precise = match projection {
            Projection::Xy => hit.measures_phi(),
            Projection::Rz => !hit.measures_phi(),
        };
        let sigma = if precise {
            self.params.precise_sigma
        } else {
            self.params.coarse_sigma
        };
        1.0 / (sigma * sigma)
    }

    fn accumulate(
        &self,
        points: &[WeightedPoint],
        direction: [f64; 2],
    ) -> Result<Accumulation, RefitRejection> {
        let mut total = 0.0;
        let mut centroid = [0.0f64, 0.0];
        for p in points {
            total += p.weight;
            centroid[0] += p.weight * p.pos[0];
            centroid[1] += p.weight * p.pos[1];
        }
        if points.is_empty() || total <= 0.0 {
            return Err(RefitRejection::NoHits);
        }
        centroid[0] /= total;
        centroid[1] /= total;

        let mut sum = [0.0f64, 0.0];
        let mut min_proj = f64::INFINITY;
        let mut max_proj = f64::NEG_INFINITY;
        for p in points {
            let offset = [p.pos[0] - centroid[0], p.pos[1] - centroid[1]];
            let proj = offset[0] * direction[0] + offset[1] * direction[1];
            let side = if proj >= 0.0 { 1.0 } else { -1.0 };
            sum[0] += p.weight * side * offset[0];
            sum[1] += p.weight * side * offset[1];
            min_proj = min_proj.min(proj);
            max_proj = max_proj.max(proj);
        }

        let lever_arm = max_proj - min_proj;
        if lever_arm < self.params.min_lever_arm {
            return Err(RefitRejection::ShortLeverArm { lever_arm });
        }
        if sum[0].abs() < self.params.min_accumulated && sum[1].abs() < self.params.min_accumulated {
            return Err(RefitRejection::DegenerateSum);
        }
        Ok(Accumulation { centroid, sum })
    }
}
