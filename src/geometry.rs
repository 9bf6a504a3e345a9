//! Plane geometry on the sky in the small angle approximation

use std::{f64::consts::PI, fmt};

/// Equatorial sky coordinates in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkyPosition {
    /// right ascension [deg]
    pub ra: f64,
    /// declination [deg]
    pub dec: f64,
}
impl SkyPosition {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
    /// Returns the angular separation [arcmin] between `self` and `other`
    ///
    /// The right ascension offset is scaled by the cosine of the declination of `self`
    /// and the separation is the euclidean norm of the offsets, so `self` is expected
    /// to be the field center and the separation to be small.
    pub fn flat_sky_separation(&self, other: &SkyPosition) -> f64 {
        let dra = (other.ra - self.ra) * self.dec.to_radians().cos();
        let ddec = other.dec - self.dec;
        dra.hypot(ddec) * 60.
    }
    pub fn is_finite(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite()
    }
}
impl fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.ra, self.dec)
    }
}

/// Area of a disk of radius `r`
pub fn disk_area(r: f64) -> f64 {
    PI * r * r
}

/// Overlapping area of 2 disks of radius `r` and `big_r` with centers `d` apart
///
/// `r`, `big_r` and `d` must be given in the same unit.
/// The area is never negative and a NaN distance gives a NaN area.
pub fn circle_intersection_area(r: f64, big_r: f64, d: f64) -> f64 {
    if d >= r + big_r {
        return 0f64;
    }
    if d <= (big_r - r).abs() {
        return disk_area(r.min(big_r));
    }
    let (r2, big_r2, d2) = (r * r, big_r * big_r, d * d);
    let alpha = ((d2 + r2 - big_r2) / (2. * d * r)).acos();
    let beta = ((d2 + big_r2 - r2) / (2. * d * big_r)).acos();
    // kite area, rounding may push the radicand below zero at tangency
    let radicand = (-d + r + big_r) * (d + r - big_r) * (d - r + big_r) * (d + r + big_r);
    let area = r2 * alpha + big_r2 * beta - 0.5 * radicand.max(0f64).sqrt();
    if area < 0f64 {
        0f64
    } else {
        area
    }
}
