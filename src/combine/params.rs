//! Parameter types configuring the combiner stages.
//!
//! The top-level switches mirror the options of the reconstruction job
//! (`use_cosmics`, `split_patterns`, ...). Numeric tolerances are grouped per
//! stage. Before a call runs, the switches are resolved into a [`RunMode`] so
//! the algorithms read one set of thresholds instead of branching on the
//! collision/cosmic flag everywhere.
//!
//! Lengths are millimetres.

use serde::Deserialize;

/// Combiner-wide parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CombineParams {
    /// Cosmic mode: parameter refit, no angle cut, cosmic residual formulas.
    pub use_cosmics: bool,
    /// Split roads crossing the reference cylinder (cosmic mode only).
    pub split_patterns: bool,
    /// Keep only the best-residual phi partner per eta pattern.
    pub best_phi_match: bool,
    /// Always require chamber overlap between matched eta and phi hits.
    pub use_tight_association: bool,
    /// Phi pattern size above which tight association is forced.
    pub max_size_phi_pattern_loose: usize,
    /// Eta pattern size above which tight association is forced.
    pub max_size_eta_pattern_loose: usize,
    /// Second leg of a split road points the opposite way.
    pub flip_direction_for_cosmics: bool,
    pub matching: MatchParams,
    pub refit: RefitParams,
    pub split: SplitParams,
    pub clean: CleanParams,
}

impl Default for CombineParams {
    fn default() -> Self {
        Self {
            use_cosmics: false,
            split_patterns: false,
            best_phi_match: true,
            use_tight_association: false,
            max_size_phi_pattern_loose: 40,
            max_size_eta_pattern_loose: 200,
            flip_direction_for_cosmics: false,
            matching: MatchParams::default(),
            refit: RefitParams::default(),
            split: SplitParams::default(),
            clean: CleanParams::default(),
        }
    }
}

impl CombineParams {
    /// Cosmic defaults with splitting enabled.
    pub fn cosmics() -> Self {
        Self {
            use_cosmics: true,
            split_patterns: true,
            ..Self::default()
        }
    }

    /// Whether the chamber-overlap check applies to a pair of this size.
    pub fn tight_association_for(&self, eta_hits: usize, phi_hits: usize) -> bool {
        self.use_tight_association
            || phi_hits > self.max_size_phi_pattern_loose
            || eta_hits > self.max_size_eta_pattern_loose
    }
}

/// Tolerances of the eta/phi matcher.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Collision-mode cut on the unit direction dot product (pairs at or below
    /// are skipped). In collision mode also the minimum dot product of a
    /// best-dot fallback.
    pub min_dot: f64,
    /// Phi-hit residual tolerance in the bending plane (collision mode).
    pub max_xy_distance: f64,
    /// Phi-hit residual tolerance in the `(s, z)` plane (cosmic mode).
    pub max_rz_distance: f64,
    /// Required fraction of phi hits within tolerance.
    pub min_matched_fraction: f64,
    /// Half-angle of the eta-hit proximity cone (collision mode).
    pub cone_half_angle_deg: f64,
    /// Distance at which the cosmic proximity window starts to widen.
    pub radial_scale_reference: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            min_dot: 0.5,
            max_xy_distance: 3500.0,
            max_rz_distance: 1500.0,
            min_matched_fraction: 0.25,
            cone_half_angle_deg: 30.0,
            radial_scale_reference: 7000.0,
        }
    }
}

/// Cosmic parameter refit.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RefitParams {
    /// Resolution of a hit in its precise coordinate.
    pub precise_sigma: f64,
    /// Resolution of a hit in its coarse coordinate.
    pub coarse_sigma: f64,
    /// Minimum extent of the hits along the line for an update.
    pub min_lever_arm: f64,
    /// Accumulated offset sums below this are considered degenerate.
    pub min_accumulated: f64,
}

impl Default for RefitParams {
    fn default() -> Self {
        Self {
            precise_sigma: 20.0,
            coarse_sigma: 400.0,
            min_lever_arm: 2000.0,
            min_accumulated: 1e-6,
        }
    }
}

/// Reference cylinder of the splitter (calorimeter envelope).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    pub cylinder_radius: f64,
    pub cylinder_half_length: f64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            cylinder_radius: 4000.0,
            cylinder_half_length: 6000.0,
        }
    }
}

/// Residual cuts of the pattern cleaner.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CleanParams {
    pub max_xy_distance: f64,
    pub max_rz_distance: f64,
    /// Distance at which the xy window starts to widen.
    pub radial_scale_reference: f64,
    /// Sagitta coefficient (per mm) of the curvature-corrected rz trajectory.
    pub sagitta_coeff: f64,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            max_xy_distance: 3500.0,
            max_rz_distance: 1500.0,
            radial_scale_reference: 7000.0,
            sagitta_coeff: 1e-5,
        }
    }
}

/// Projection in which phi-hit residuals are evaluated during matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResidualProjection {
    /// Against the eta pattern's bending-plane line.
    Xy,
    /// Against the refined `(s, z)` line.
    Rz,
}

/// Loose test that at least one eta hit is close to the phi road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProximityTest {
    /// Hit position inside a cone around the road direction.
    Cone { half_angle: f64 },
    /// xy residual to the refined line within `tolerance · max(1, |hit|/reference)`.
    ScaledWindow { tolerance: f64, reference: f64 },
}

/// Resolved behaviour of one combination call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunMode {
    /// Pairs with `dot` at or below are skipped; `None` disables the cut.
    pub angle_cut: Option<f64>,
    /// The best-dot fallback partner needs `dot` above this; `None` accepts
    /// any orientation.
    pub fallback_min_dot: Option<f64>,
    pub projection: ResidualProjection,
    pub residual_tolerance: f64,
    pub min_matched_fraction: f64,
    pub proximity: ProximityTest,
    /// Re-estimate line parameters from pooled hits before matching.
    pub refit: bool,
    pub split: bool,
    pub flip_direction: bool,
    pub best_phi_match: bool,
}

impl RunMode {
    pub fn from_params(params: &CombineParams) -> Self {
        let m = &params.matching;
        if params.use_cosmics {
            Self {
                angle_cut: None,
                // Cosmic eta and phi roads of one track may point opposite ways.
                fallback_min_dot: None,
                projection: ResidualProjection::Rz,
                residual_tolerance: m.max_rz_distance,
                min_matched_fraction: m.min_matched_fraction,
                proximity: ProximityTest::ScaledWindow {
                    tolerance: m.max_xy_distance,
                    reference: m.radial_scale_reference,
                },
                refit: true,
                split: params.split_patterns,
                flip_direction: params.flip_direction_for_cosmics,
                best_phi_match: params.best_phi_match,
            }
        } else {
            Self {
                angle_cut: Some(m.min_dot),
                fallback_min_dot: Some(m.min_dot),
                projection: ResidualProjection::Xy,
                residual_tolerance: m.max_xy_distance,
                min_matched_fraction: m.min_matched_fraction,
                proximity: ProximityTest::Cone {
                    half_angle: m.cone_half_angle_deg.to_radians(),
                },
                refit: false,
                // Splitting only makes sense for refitted cosmic roads.
                split: false,
                flip_direction: params.flip_direction_for_cosmics,
                best_phi_match: params.best_phi_match,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_mode_forces_split_off() {
        let params = CombineParams {
            split_patterns: true,
            ..Default::default()
        };
        let mode = RunMode::from_params(&params);
        assert!(!mode.split);
        assert!(!mode.refit);
        assert_eq!(mode.angle_cut, Some(0.5));
        assert_eq!(mode.fallback_min_dot, Some(0.5));
        assert_eq!(mode.projection, ResidualProjection::Xy);
        assert_eq!(mode.residual_tolerance, 3500.0);
    }

    #[test]
    fn cosmic_mode_drops_angle_cut() {
        let mode = RunMode::from_params(&CombineParams::cosmics());
        assert!(mode.split);
        assert!(mode.refit);
        assert_eq!(mode.angle_cut, None);
        assert_eq!(mode.fallback_min_dot, None);
        assert_eq!(mode.projection, ResidualProjection::Rz);
        assert_eq!(mode.residual_tolerance, 1500.0);
        assert!(matches!(mode.proximity, ProximityTest::ScaledWindow { .. }));
    }

    #[test]
    fn tight_association_thresholds() {
        let params = CombineParams::default();
        assert!(!params.tight_association_for(200, 40));
        assert!(params.tight_association_for(201, 1));
        assert!(params.tight_association_for(1, 41));
        let forced = CombineParams {
            use_tight_association: true,
            ..Default::default()
        };
        assert!(forced.tight_association_for(1, 1));
    }

    #[test]
    fn params_deserialize_with_partial_overrides() {
        let json = r#"{ "use_cosmics": true, "matching": { "min_dot": 0.7 } }"#;
        let params: CombineParams = serde_json::from_str(json).expect("valid params");
        assert!(params.use_cosmics);
        assert_eq!(params.matching.min_dot, 0.7);
        assert_eq!(params.matching.max_xy_distance, 3500.0);
        assert!(params.best_phi_match);
    }
}
