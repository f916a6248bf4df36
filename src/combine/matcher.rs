//! Eta/phi matching.
//!
//! For every eta pattern the matcher evaluates all phi patterns and keeps the
//! compatible ones as partners. A pair is compatible when enough phi hits lie
//! close to the road, at least one eta hit is near the road direction and, for
//! large patterns or on request, the matched hits share a chamber. Collision
//! and cosmic data run the same loop; [`RunMode`] decides which projection the
//! residuals use, how proximity is tested and whether the road parameters are
//! re-estimated from the pooled hits first.
//!
//! Unmatched eta patterns are rescued in two steps: a phi pattern synthesised
//! from the companion-hit association map, then the phi pattern with the best
//! direction agreement. An eta pattern left without partner is emitted alone.

use super::candidate::Candidate;
use super::params::{CombineParams, ProximityTest, ResidualProjection, RunMode};
use super::refit::ParameterRefiner;
use super::split::PatternSplitter;
use crate::angle::{phi_of, unit_direction};
use crate::association::AssociationMap;
use crate::diagnostics::MatchStage;
use crate::geometry::{radial_scale, within_cone};
use crate::pattern::{LineParameters, Pattern, PatternArena, PatternId};
use crate::types::{ChamberId, Hit, HitId, Vec3};
use log::{debug, trace, warn};
use std::collections::HashSet;

/// Why a phi pattern was not accepted as partner.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Rejection {
    Angle { dot: f64 },
    Proximity,
    Residual { matched: usize, required: f64 },
    TightAssociation,
}

/// Phi pattern that passed every test for the current eta pattern.
#[derive(Clone, Copy, Debug)]
struct AcceptedPair {
    phi: PatternId,
    average_residual: f64,
    /// Road parameters re-estimated from the pooled hits (cosmic mode).
    refined: Option<LineParameters>,
}

/// Phi side of a pair about to be registered.
enum Partner<'h> {
    Existing(PatternId),
    Synthesised(Pattern<'h>),
}

#[derive(Clone, Copy, Debug)]
struct BestDot {
    phi: PatternId,
    dot: f64,
}

pub struct Matcher<'a, 'h> {
    params: &'a CombineParams,
    mode: RunMode,
    association: &'a AssociationMap<'h>,
    refiner: ParameterRefiner<'a>,
    splitter: Option<PatternSplitter>,
}

impl<'a, 'h> Matcher<'a, 'h> {
    pub fn new(params: &'a CombineParams, association: &'a AssociationMap<'h>) -> Self {
        let mode = RunMode::from_params(params);
        let splitter = mode
            .split
            .then(|| PatternSplitter::new(&params.split, mode.flip_direction));
        Self {
            params,
            mode,
            association,
            refiner: ParameterRefiner::new(&params.refit),
            splitter,
        }
    }

    /// Matches every eta pattern against every phi pattern. Derived patterns
    /// are appended to `arena`; candidates are returned in eta order.
    pub fn match_all(
        &self,
        eta_ids: &[PatternId],
        phi_ids: &[PatternId],
        arena: &mut PatternArena<'h>,
        stats: &mut MatchStage,
    ) -> Vec<Candidate> {
        stats.eta_patterns += eta_ids.len();
        stats.phi_patterns += phi_ids.len();
        let mut candidates = Vec::with_capacity(eta_ids.len());
        for &eta_id in eta_ids {
            if arena[eta_id].is_empty() {
                stats.skipped_empty_eta += 1;
                trace!("matcher: eta {eta_id} has no hits, skipped");
                continue;
            }
            let found = self.match_eta(eta_id, phi_ids, arena, stats);
            candidates.extend(found);
        }
        stats.candidates += candidates.len();
        candidates
    }

    fn match_eta(
        &self,
        eta_id: PatternId,
        phi_ids: &[PatternId],
        arena: &mut PatternArena<'h>,
        stats: &mut MatchStage,
    ) -> Vec<Candidate> {
        let eta = arena[eta_id].clone();
        let eta_dir = eta.unit_direction();
        let mut best_dot: Option<BestDot> = None;
        let mut accepted: Vec<AcceptedPair> = Vec::new();

        for &phi_id in phi_ids {
            let phi = &arena[phi_id];
            if phi.is_empty() {
                continue;
            }
            stats.pairs_evaluated += 1;
            let dot = eta_dir.dot(&phi.unit_direction());
            if best_dot.map_or(true, |b| dot > b.dot) {
                best_dot = Some(BestDot { phi: phi_id, dot });
            }
            match self.evaluate(&eta, phi, phi_id, dot, stats) {
                Ok(pair) => {
                    stats.accepted_pairs += 1;
                    debug!(
                        "matcher: eta {eta_id} + phi {phi_id} accepted (avg residual {:.1})",
                        pair.average_residual
                    );
                    accepted.push(pair);
                }
                Err(Rejection::Angle { dot }) => {
                    stats.angle_rejections += 1;
                    trace!("matcher: eta {eta_id} + phi {phi_id} rejected: dot {dot:.3}");
                }
                Err(Rejection::Proximity) => {
                    stats.proximity_rejections += 1;
                    trace!("matcher: eta {eta_id} + phi {phi_id} rejected: no eta hit near road");
                }
                Err(Rejection::Residual { matched, required }) => {
                    stats.residual_rejections += 1;
                    trace!(
                        "matcher: eta {eta_id} + phi {phi_id} rejected: {matched} phi hits matched, {required:.1} required"
                    );
                }
                Err(Rejection::TightAssociation) => {
                    stats.tight_association_rejections += 1;
                    trace!("matcher: eta {eta_id} + phi {phi_id} rejected: no shared chamber");
                }
            }
        }

        if !accepted.is_empty() {
            if self.mode.best_phi_match {
                let mut best = accepted[0];
                for pair in &accepted[1..] {
                    if pair.average_residual < best.average_residual {
                        best = *pair;
                    }
                }
                accepted = vec![best];
            }
            let mut out = Vec::new();
            for pair in accepted {
                let partner = Partner::Existing(pair.phi);
                out.extend(self.register(eta_id, &eta, partner, pair.refined, arena, stats));
            }
            return out;
        }

        // Nothing accepted: the only recorded partner is the best-dot pattern.
        let recorded: Vec<HashSet<HitId>> = best_dot
            .iter()
            .map(|b| arena[b.phi].hit_ids())
            .collect();
        if let Some((pattern, refined)) = self.synthesise(&eta, stats) {
            let ids = pattern.hit_ids();
            let shadowed = recorded
                .iter()
                .any(|other| ids.len() < other.len() && ids.is_subset(other));
            if shadowed {
                stats.association_discarded += 1;
                debug!("matcher: association pattern for eta {eta_id} is a subset of a recorded partner, discarded");
            } else {
                stats.association_patterns += 1;
                debug!(
                    "matcher: eta {eta_id} paired with association pattern ({} hits)",
                    pattern.len()
                );
                let partner = Partner::Synthesised(pattern);
                return self.register(eta_id, &eta, partner, refined, arena, stats);
            }
        }

        match best_dot {
            Some(best) if self.mode.fallback_min_dot.map_or(true, |min| best.dot > min) => {
                stats.fallbacks += 1;
                debug!(
                    "matcher: eta {eta_id} falls back to phi {} (dot {:.3})",
                    best.phi, best.dot
                );
                vec![Candidate::new(eta_id, Some(best.phi))]
            }
            _ => {
                stats.standalone += 1;
                debug!("matcher: eta {eta_id} emitted without phi");
                vec![Candidate::standalone(eta_id)]
            }
        }
    }

    fn evaluate(
        &self,
        eta: &Pattern<'h>,
        phi: &Pattern<'h>,
        phi_id: PatternId,
        dot: f64,
        stats: &mut MatchStage,
    ) -> Result<AcceptedPair, Rejection> {
        if let Some(cut) = self.mode.angle_cut {
            if dot <= cut {
                return Err(Rejection::Angle { dot });
            }
        }

        let refined = if self.mode.refit {
            let initial = LineParameters {
                r0: phi.xy_line().r0,
                phi: phi.phi(),
                rz0: eta.parameters().rz0,
                theta: eta.theta(),
            };
            Some(self.refit(initial, eta.hits().iter().chain(phi.hits()).copied(), stats))
        } else {
            None
        };

        let residual = |hit: &Hit| -> f64 {
            let signed = match (self.mode.projection, refined) {
                (ResidualProjection::Rz, Some(params)) => params.rz_line().residual(&hit.position),
                (ResidualProjection::Rz, None) => eta.rz_line().residual(&hit.position),
                (ResidualProjection::Xy, _) => eta.xy_line().residual(&hit.position),
            };
            signed.abs()
        };
        let mut matched: Vec<&Hit> = Vec::new();
        let mut residual_sum = 0.0;
        for hit in phi.hits() {
            let r = residual(hit);
            if r <= self.mode.residual_tolerance {
                residual_sum += r;
                matched.push(hit);
            }
        }

        if !self.eta_near_road(eta, phi, refined) {
            return Err(Rejection::Proximity);
        }

        let required = self.mode.min_matched_fraction * phi.len() as f64;
        if matched.is_empty() || (matched.len() as f64) < required {
            return Err(Rejection::Residual {
                matched: matched.len(),
                required,
            });
        }

        if self.params.tight_association_for(eta.len(), phi.len()) {
            let eta_chambers: HashSet<ChamberId> = eta.hits().iter().map(|h| h.chamber).collect();
            let overlap = matched
                .iter()
                .map(|h| h.chamber)
                .collect::<HashSet<_>>()
                .intersection(&eta_chambers)
                .count();
            if overlap == 0 {
                return Err(Rejection::TightAssociation);
            }
        }

        Ok(AcceptedPair {
            phi: phi_id,
            average_residual: residual_sum / matched.len() as f64,
            refined,
        })
    }

    /// At least one eta hit close to the road.
    fn eta_near_road(
        &self,
        eta: &Pattern<'h>,
        phi: &Pattern<'h>,
        refined: Option<LineParameters>,
    ) -> bool {
        match self.mode.proximity {
            ProximityTest::Cone { half_angle } => {
                let axis = unit_direction(phi.phi(), eta.theta());
                eta.hits()
                    .iter()
                    .any(|h| within_cone(&h.position, &axis, half_angle))
            }
            ProximityTest::ScaledWindow {
                tolerance,
                reference,
            } => {
                let line = match refined {
                    Some(params) => params.xy_line(),
                    None => phi.xy_line(),
                };
                eta.hits().iter().any(|h| {
                    line.residual(&h.position).abs()
                        < tolerance * radial_scale(&h.position, reference)
                })
            }
        }
    }

    fn refit<I>(&self, initial: LineParameters, hits: I, stats: &mut MatchStage) -> LineParameters
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        let outcome = self.refiner.refit(initial, hits);
        if outcome.any_update() {
            stats.refits_applied += 1;
        } else {
            stats.refits_rejected += 1;
        }
        outcome.parameters
    }

    /// Phi pattern built from the companions of the eta hits.
    fn synthesise(
        &self,
        eta: &Pattern<'h>,
        stats: &mut MatchStage,
    ) -> Option<(Pattern<'h>, Option<LineParameters>)> {
        if self.association.is_empty() {
            return None;
        }
        let mut seen = HashSet::new();
        let mut companions: Vec<&'h Hit> = Vec::new();
        for hit in eta.hits() {
            for &companion in self.association.companions(hit.id) {
                if !eta.contains(companion.id) && seen.insert(companion.id) {
                    companions.push(companion);
                }
            }
        }
        if companions.is_empty() {
            return None;
        }

        let sum: Vec3 = companions.iter().map(|h| h.position).sum();
        if sum.x.hypot(sum.y) <= f64::EPSILON {
            warn!(
                "matcher: companions of a {}-hit eta pattern have no azimuth, association skipped",
                eta.len()
            );
            return None;
        }
        let eta_params = eta.parameters();
        let mut params = LineParameters {
            r0: 0.0,
            phi: phi_of(&sum),
            rz0: eta_params.rz0,
            theta: eta_params.theta,
        };
        let refined = if self.mode.refit {
            params = self.refit(
                params,
                eta.hits().iter().chain(companions.iter()).copied(),
                stats,
            );
            Some(params)
        } else {
            None
        };
        let pattern = Pattern::from_parameters(&params, eta.curvature_scale(), companions);
        Some((pattern, refined))
    }

    /// Stores the pair in the arena. With refined parameters both sides are
    /// rebuilt on the refined road and, when enabled, split into two legs.
    fn register(
        &self,
        eta_id: PatternId,
        eta: &Pattern<'h>,
        partner: Partner<'h>,
        refined: Option<LineParameters>,
        arena: &mut PatternArena<'h>,
        stats: &mut MatchStage,
    ) -> Vec<Candidate> {
        let Some(params) = refined else {
            let phi_id = match partner {
                Partner::Existing(id) => id,
                Partner::Synthesised(pattern) => arena.insert(pattern),
            };
            return vec![Candidate::new(eta_id, Some(phi_id))];
        };

        let phi = match partner {
            Partner::Existing(id) => arena[id].clone(),
            Partner::Synthesised(pattern) => pattern,
        };
        let eta_road = Pattern::from_parameters(&params, eta.curvature_scale(), eta.hits().iter().copied());
        let phi_road = Pattern::from_parameters(&params, phi.curvature_scale(), phi.hits().iter().copied());

        let legs = self
            .splitter
            .as_ref()
            .and_then(|splitter| splitter.split_pair(&eta_road, &phi_road));
        let Some(legs) = legs else {
            let eta_new = arena.insert(eta_road);
            let phi_new = arena.insert(phi_road);
            return vec![Candidate::new(eta_new, Some(phi_new))];
        };

        stats.splits += 1;
        let mut out = Vec::with_capacity(2);
        for (leg_index, leg) in legs.into_iter().enumerate() {
            if leg.eta.is_empty() {
                stats.dropped_legs += 1;
                debug!("splitter: leg {leg_index} of eta {eta_id} has no eta hits, dropped");
                continue;
            }
            let phi_leg = if leg.phi.is_empty() {
                None
            } else {
                Some(arena.insert(leg.phi))
            };
            let eta_leg = arena.insert(leg.eta);
            out.push(Candidate::new(eta_leg, phi_leg));
        }
        out
    }
}
