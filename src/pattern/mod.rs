//! Line patterns and their call-scoped storage.
//!
//! A [`Pattern`] is an immutable straight-line candidate (global position and
//! direction) together with the hits it was built from. Hits are borrowed from
//! the upstream producer; a pattern never owns them. Every transformation in
//! the combiner (refit, split, clean, synthesis) creates a new pattern, which
//! is stored in the [`PatternArena`] of the running call.
//!
//! The direction's magnitude is not normalised: it carries the curvature scale
//! used to derive the momentum sign (see [`Pattern::inverse_curvature`]).

mod arena;

pub use arena::{PatternArena, PatternId};

use crate::angle::{phi_of, theta_of, unit_direction};
use crate::geometry::{position_from_parameters, RzLine, XyLine};
use crate::types::{Hit, HitId, Vec3};
use std::collections::HashSet;

/// Below this direction magnitude a pattern is treated as straight.
pub const MIN_CURVATURE_SCALE: f64 = 2.0;

/// Straight-line candidate with its supporting hits.
#[derive(Clone, Debug)]
pub struct Pattern<'h> {
    position: Vec3,
    direction: Vec3,
    hits: Vec<&'h Hit>,
}

impl<'h> Pattern<'h> {
    /// Builds a pattern; repeated hit ids are dropped (first one wins).
    pub fn new<I>(position: Vec3, direction: Vec3, hits: I) -> Self
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        let mut seen = HashSet::new();
        let hits = hits.into_iter().filter(|h| seen.insert(h.id)).collect();
        Self {
            position,
            direction,
            hits,
        }
    }

    /// Builds a pattern from line parameters in both projections.
    pub fn from_parameters<I>(params: &LineParameters, scale: f64, hits: I) -> Self
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        let position = position_from_parameters(params.r0, params.phi, params.rz0, params.theta);
        let direction = unit_direction(params.phi, params.theta) * scale;
        Self::new(position, direction, hits)
    }

    /// Same line, different hits.
    pub fn with_hits<I>(&self, hits: I) -> Self
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        Self::new(self.position, self.direction, hits)
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn direction(&self) -> &Vec3 {
        &self.direction
    }

    pub fn hits(&self) -> &[&'h Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hit_ids(&self) -> HashSet<HitId> {
        self.hits.iter().map(|h| h.id).collect()
    }

    pub fn contains(&self, id: HitId) -> bool {
        self.hits.iter().any(|h| h.id == id)
    }

    pub fn phi(&self) -> f64 {
        phi_of(&self.direction)
    }

    pub fn theta(&self) -> f64 {
        theta_of(&self.direction)
    }

    pub fn unit_direction(&self) -> Vec3 {
        unit_direction(self.phi(), self.theta())
    }

    /// Magnitude of the stored direction.
    pub fn curvature_scale(&self) -> f64 {
        self.direction.norm()
    }

    pub fn xy_line(&self) -> XyLine {
        XyLine::through(&self.position, self.phi())
    }

    pub fn rz_line(&self) -> RzLine {
        RzLine::through(&self.position, self.theta(), self.phi())
    }

    pub fn parameters(&self) -> LineParameters {
        let xy = self.xy_line();
        let rz = self.rz_line();
        LineParameters {
            r0: xy.r0,
            phi: xy.phi,
            rz0: rz.rz0,
            theta: rz.theta,
        }
    }

    /// `-1` when the signed xy distance to the origin is negative, else `+1`.
    pub fn charge(&self) -> f64 {
        if self.xy_line().r0 < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Signed inverse curvature `charge / |direction|`, zero for nearly
    /// straight (low-magnitude) directions.
    pub fn inverse_curvature(&self) -> f64 {
        let scale = self.curvature_scale();
        if scale > MIN_CURVATURE_SCALE {
            self.charge() / scale
        } else {
            0.0
        }
    }
}

/// Line parameters `(r0, φ)` in the bending plane and `(rz0, θ)` in `(s, z)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineParameters {
    pub r0: f64,
    pub phi: f64,
    pub rz0: f64,
    pub theta: f64,
}

impl LineParameters {
    pub fn xy_line(&self) -> XyLine {
        XyLine::new(self.r0, self.phi)
    }

    pub fn rz_line(&self) -> RzLine {
        RzLine::new(self.rz0, self.theta, self.phi)
    }
}
