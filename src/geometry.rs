//! Line parameterisations and distance helpers in the two detector
//! projections.
//!
//! - Bending plane (xy): a line is `{p : p.x sinφ − p.y cosφ = r0}`; `r0` is
//!   the signed distance of the line to the beam axis.
//! - Non-bending plane (s, z): `s = x cosφ + y sinφ` is the coordinate along
//!   the xy direction and a line is `{(s, z) : s cosθ − z sinθ = rz0}`.
//!
//! Both forms are normalised so that the residual of a point equals its signed
//! perpendicular distance to the line.

use crate::angle::angle_between;
use crate::types::Vec3;

const EPS: f64 = 1e-12;

/// Straight line in the bending plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XyLine {
    pub r0: f64,
    pub phi: f64,
}

impl XyLine {
    pub fn new(r0: f64, phi: f64) -> Self {
        Self { r0, phi }
    }

    /// Line with azimuth `phi` passing through `point`.
    pub fn through(point: &Vec3, phi: f64) -> Self {
        Self {
            r0: signed_offset_xy(point, phi),
            phi,
        }
    }

    /// Signed perpendicular distance of `point` (projected onto xy) to the line.
    #[inline]
    pub fn residual(&self, point: &Vec3) -> f64 {
        signed_offset_xy(point, self.phi) - self.r0
    }
}

/// Straight line in the `(s, z)` plane; `phi` fixes the meaning of `s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RzLine {
    pub rz0: f64,
    pub theta: f64,
    pub phi: f64,
}

impl RzLine {
    pub fn new(rz0: f64, theta: f64, phi: f64) -> Self {
        Self { rz0, theta, phi }
    }

    /// Line with polar angle `theta` passing through `point`, with `s` taken
    /// along `phi`.
    pub fn through(point: &Vec3, theta: f64, phi: f64) -> Self {
        let s = along_xy(point, phi);
        Self {
            rz0: rz_offset(s, point.z, theta),
            theta,
            phi,
        }
    }

    /// Signed perpendicular distance of `point` to the line in `(s, z)`.
    #[inline]
    pub fn residual(&self, point: &Vec3) -> f64 {
        let s = along_xy(point, self.phi);
        rz_offset(s, point.z, self.theta) - self.rz0
    }

    /// Residual against the curvature-corrected trajectory. The trajectory
    /// deviates from the straight line by a sagitta `κ · coeff · s²` along z,
    /// evaluated at the hit's own `s`.
    #[inline]
    pub fn curved_residual(&self, point: &Vec3, inverse_curvature: f64, sagitta_coeff: f64) -> f64 {
        let s = along_xy(point, self.phi);
        let sagitta = inverse_curvature * sagitta_coeff * s * s;
        rz_offset(s, point.z - sagitta, self.theta) - self.rz0
    }
}

/// `x sinφ − y cosφ`.
#[inline]
pub fn signed_offset_xy(point: &Vec3, phi: f64) -> f64 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    point.x * sin_phi - point.y * cos_phi
}

/// `x cosφ + y sinφ`.
#[inline]
pub fn along_xy(point: &Vec3, phi: f64) -> f64 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    point.x * cos_phi + point.y * sin_phi
}

/// `s cosθ − z sinθ`.
#[inline]
pub fn rz_offset(s: f64, z: f64, theta: f64) -> f64 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    s * cos_theta - z * sin_theta
}

/// Point of closest approach in xy, with the z that places it on the rz line.
pub fn position_from_parameters(r0: f64, phi: f64, rz0: f64, theta: f64) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let sin_theta = theta.sin();
    let z = if sin_theta.abs() > EPS { -rz0 / sin_theta } else { 0.0 };
    Vec3::new(r0 * sin_phi, -r0 * cos_phi, z)
}

/// Scale factor `max(1, |point| / reference)` widening windows far from the
/// interaction point.
#[inline]
pub fn radial_scale(point: &Vec3, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 1.0;
    }
    (point.norm() / reference).max(1.0)
}

/// True when the angle between `point` (seen from the origin) and `axis` is at
/// most `half_angle`.
pub fn within_cone(point: &Vec3, axis: &Vec3, half_angle: f64) -> bool {
    let np = point.norm();
    let na = axis.norm();
    if np <= EPS || na <= EPS {
        return false;
    }
    angle_between(point, axis) <= half_angle
}

/// Finite cylinder centred on the origin with its axis along z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceCylinder {
    pub radius: f64,
    pub half_length: f64,
}

impl ReferenceCylinder {
    /// Whether the infinite line `position + t · direction` crosses the volume.
    pub fn intersects(&self, position: &Vec3, direction: &Vec3) -> bool {
        let ux = direction.x;
        let uy = direction.y;
        let perp_sq = ux * ux + uy * uy;
        if perp_sq <= EPS {
            // Parallel to the axis: crosses both end caps iff inside the radius.
            return position.x.hypot(position.y) < self.radius;
        }
        let px = position.x;
        let py = position.y;
        // Solve |p_xy + t u_xy|² = R².
        let t_mid = -(px * ux + py * uy) / perp_sq;
        let closest_sq = (px + t_mid * ux).powi(2) + (py + t_mid * uy).powi(2);
        let radius_sq = self.radius * self.radius;
        if closest_sq >= radius_sq {
            return false;
        }
        let half_span = ((radius_sq - closest_sq) / perp_sq).sqrt();
        let z_a = position.z + (t_mid - half_span) * direction.z;
        let z_b = position.z + (t_mid + half_span) * direction.z;
        let (z_min, z_max) = if z_a <= z_b { (z_a, z_b) } else { (z_b, z_a) };
        z_max >= -self.half_length && z_min <= self.half_length
    }
}
