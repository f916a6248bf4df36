//! Angle utilities shared by the matcher, refiner, splitter and cleaner.
//!
//! Azimuth `phi` is measured in the xy plane from +x, polar angle `theta` from
//! +z. Directions built from `(phi, theta)` are unit vectors.

use crate::types::Vec3;
use std::f64::consts::{PI, TAU};

/// Wraps an azimuth into `(-π, π]`.
#[inline]
pub fn wrap_phi(angle: f64) -> f64 {
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Azimuth of a vector, `atan2(y, x)`.
#[inline]
pub fn phi_of(v: &Vec3) -> f64 {
    v.y.atan2(v.x)
}

/// Polar angle of a vector in `[0, π]`. A zero vector yields `π/2`.
#[inline]
pub fn theta_of(v: &Vec3) -> f64 {
    let perp = v.x.hypot(v.y);
    if perp == 0.0 && v.z == 0.0 {
        return PI / 2.0;
    }
    perp.atan2(v.z)
}

/// Unit direction `(sinθ cosφ, sinθ sinφ, cosθ)`.
#[inline]
pub fn unit_direction(phi: f64, theta: f64) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Antipodal angles `(φ + π, π − θ)`, i.e. the reversed direction.
#[inline]
pub fn flipped(phi: f64, theta: f64) -> (f64, f64) {
    (wrap_phi(phi + PI), PI - theta)
}

/// Unsigned angle between two 3-D vectors in `[0, π]`.
#[inline]
pub fn angle_between(a: &Vec3, b: &Vec3) -> f64 {
    let na = a.norm().max(1e-12);
    let nb = b.norm().max(1e-12);
    (a.dot(b) / (na * nb)).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wrap_phi_stays_in_range() {
        assert!(approx_eq(wrap_phi(0.5), 0.5));
        assert!(approx_eq(wrap_phi(PI), PI));
        assert!(approx_eq(wrap_phi(-PI), PI));
        assert!(approx_eq(wrap_phi(3.0 * PI / 2.0), -FRAC_PI_2));
        assert!(approx_eq(wrap_phi(5.0 * TAU + 0.25), 0.25));
    }

    #[test]
    fn unit_direction_round_trips_angles() {
        let v = unit_direction(0.7, 1.1);
        assert!(approx_eq(v.norm(), 1.0));
        assert!(approx_eq(phi_of(&v), 0.7));
        assert!(approx_eq(theta_of(&v), 1.1));
    }

    #[test]
    fn flipped_direction_is_antipodal() {
        let (phi, theta) = (0.3, 0.9);
        let (fp, ft) = flipped(phi, theta);
        let sum = unit_direction(phi, theta) + unit_direction(fp, ft);
        assert!(sum.norm() < 1e-12);
    }

    #[test]
    fn angle_between_basic() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 2.0, 0.0);
        assert!(approx_eq(angle_between(&x, &x), 0.0));
        assert!(approx_eq(angle_between(&x, &y), FRAC_PI_2));
        assert!(approx_eq(angle_between(&x, &(-x)), PI));
    }
}
