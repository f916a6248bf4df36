//! Iterative residual-based removal of incompatible hits.
//!
//! The road parameters `(r0, φ, rz0, θ)` and the signed inverse curvature are
//! taken from the pattern. A hit is kept when its bending-plane residual is
//! inside a window that widens with distance from the origin and its residual
//! to the curvature-corrected `(s, z)` trajectory is inside a fixed window. The
//! pattern is rebuilt from the kept hits until its size stops changing.

use super::params::CleanParams;
use crate::error::CombineError;
use crate::geometry::radial_scale;
use crate::pattern::Pattern;
use crate::types::Hit;
use log::{error, trace};

/// Outcome of a cleaning run.
#[derive(Clone, Debug)]
pub struct CleanResult<'h> {
    pub pattern: Pattern<'h>,
    pub removed: usize,
    pub iterations: usize,
}

pub struct PatternCleaner<'a> {
    params: &'a CleanParams,
}

impl<'a> PatternCleaner<'a> {
    pub fn new(params: &'a CleanParams) -> Self {
        Self { params }
    }

    /// Cleans `pattern` until stable. The result may be empty.
    pub fn clean<'h>(&self, pattern: &Pattern<'h>) -> Result<CleanResult<'h>, CombineError> {
        let initial = pattern.len();
        let mut current = pattern.clone();
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            let before = current.len();
            let next = self.clean_once(&current);
            let after = next.len();
            if after > before {
                error!(
                    "pattern cleaner grew pattern from {before} to {after} hits (iteration {iterations})"
                );
                return Err(CombineError::CleanerGrewPattern {
                    before,
                    after,
                    iteration: iterations,
                });
            }
            current = next;
            if after == before || after == 0 {
                break;
            }
        }
        Ok(CleanResult {
            removed: initial - current.len(),
            pattern: current,
            iterations,
        })
    }

    /// One filtering pass; the line itself is kept unchanged.
    pub fn clean_once<'h>(&self, pattern: &Pattern<'h>) -> Pattern<'h> {
        let kept: Vec<&'h Hit> = pattern
            .hits()
            .iter()
            .copied()
            .filter(|hit| self.accepts(pattern, hit))
            .collect();
        pattern.with_hits(kept)
    }

    fn accepts(&self, pattern: &Pattern<'_>, hit: &Hit) -> bool {
        let xy_line = pattern.xy_line();
        let rz_line = pattern.rz_line();
        let kappa = pattern.inverse_curvature();

        let xy = xy_line.residual(&hit.position);
        let rz = rz_line.curved_residual(&hit.position, kappa, self.params.sagitta_coeff);
        let scale = radial_scale(&hit.position, self.params.radial_scale_reference);
        let keep = xy.abs() < scale * self.params.max_xy_distance
            && rz.abs() < self.params.max_rz_distance;
        if !keep {
            trace!(
                "cleaner: dropping hit {:?} (xy={:.1}, rz={:.1}, scale={:.2})",
                hit.id,
                xy,
                rz,
                scale
            );
        }
        keep
    }
}
