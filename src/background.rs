//! Background annulus area
//!
//! The background is extracted from an annulus centered on the target from which
//! the catalog sources are excised.
//! [BackgroundArea] gives the area left in the annulus once the exclusion circles are removed,
//! in units of the source aperture area.

use std::fmt;

use crate::{
    geometry::{circle_intersection_area, disk_area, SkyPosition},
    ANNULUS_INNER_RADIUS_ARCMIN, ANNULUS_OUTER_RADIUS_ARCMIN, SOURCE_RADIUS_ARCMIN,
};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnnulusError {
    #[error("annulus radii must be finite and positive, found ({0},{1})")]
    NonPositive(f64, f64),
    #[error("annulus inner radius ({0}) must be smaller than the outer radius ({1})")]
    Inverted(f64, f64),
}
type Result<T> = std::result::Result<T, AnnulusError>;

/// Annulus inner and outer radii [arcmin]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annulus {
    inner_radius: f64,
    outer_radius: f64,
}
impl Default for Annulus {
    fn default() -> Self {
        Self {
            inner_radius: ANNULUS_INNER_RADIUS_ARCMIN,
            outer_radius: ANNULUS_OUTER_RADIUS_ARCMIN,
        }
    }
}
impl Annulus {
    /// Creates a new annulus, `inner_radius` must be smaller than `outer_radius`
    pub fn new(inner_radius: f64, outer_radius: f64) -> Result<Self> {
        let valid = |x: f64| x.is_finite() && x > 0f64;
        if !(valid(inner_radius) && valid(outer_radius)) {
            return Err(AnnulusError::NonPositive(inner_radius, outer_radius));
        }
        if inner_radius >= outer_radius {
            return Err(AnnulusError::Inverted(inner_radius, outer_radius));
        }
        Ok(Self {
            inner_radius,
            outer_radius,
        })
    }
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }
    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }
    /// Returns the annulus area [arcmin^2]
    pub fn area(&self) -> f64 {
        disk_area(self.outer_radius) - disk_area(self.inner_radius)
    }
    /// Returns the area of a disk of radius `radius` that lies within the annulus
    ///
    /// `distance` is the distance between the disk and the annulus centers,
    /// a NaN distance gives a NaN overlap.
    pub fn overlap(&self, radius: f64, distance: f64) -> f64 {
        let a_out = circle_intersection_area(radius, self.outer_radius, distance);
        let a_in = circle_intersection_area(radius, self.inner_radius, distance);
        let a = a_out - a_in;
        if a < 0f64 {
            0f64
        } else {
            a
        }
    }
    /// Estimates the background area of the annulus centered on `center`
    /// once the exclusion circles of radius `source_radius` around `sources` are removed
    ///
    /// Overlapping exclusion circles are each subtracted in full.
    pub fn background<'a, I>(
        &self,
        center: &SkyPosition,
        sources: I,
        source_radius: f64,
    ) -> BackgroundArea
    where
        I: IntoIterator<Item = &'a SkyPosition>,
    {
        let mut n_source = 0;
        let total_overlap: f64 = sources
            .into_iter()
            .map(|source| {
                n_source += 1;
                let distance = center.flat_sky_separation(source);
                let overlap = self.overlap(source_radius, distance);
                log::debug!("source at {source}: {distance:.3}' from center, overlap: {overlap:.4}");
                overlap
            })
            .sum();
        let annulus_area = self.area();
        let reference_area = disk_area(source_radius);
        let net_area = annulus_area - total_overlap;
        log::info!(
            "{} sources overlap {:.4} arcmin^2 of the {:.4} arcmin^2 annulus",
            n_source,
            total_overlap,
            annulus_area
        );
        BackgroundArea {
            annulus_area,
            total_overlap,
            net_area,
            reference_area,
            source_radius,
        }
    }
}

/// Background annulus area budget [arcmin^2]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundArea {
    /// area of the full annulus
    pub annulus_area: f64,
    /// area of the exclusion circles within the annulus
    pub total_overlap: f64,
    /// annulus area minus exclusion area, may be negative
    pub net_area: f64,
    /// area of the source aperture
    pub reference_area: f64,
    source_radius: f64,
}
impl BackgroundArea {
    /// Ratio of the net background area to the source aperture area
    pub fn ratio(&self) -> f64 {
        self.net_area / self.reference_area
    }
}
impl fmt::Display for BackgroundArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Background annulus remaining area / {}' circle area = {:.2}",
            self.source_radius,
            self.ratio()
        )
    }
}

/// Background area with the default annulus and source aperture
pub fn background<'a, I>(center: &SkyPosition, sources: I) -> BackgroundArea
where
    I: IntoIterator<Item = &'a SkyPosition>,
{
    Annulus::default().background(center, sources, SOURCE_RADIUS_ARCMIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn center() -> SkyPosition {
        SkyPosition::new(183.0648, -23.5882)
    }

    #[test]
    fn empty_catalog() {
        let area = background(&center(), &Vec::<SkyPosition>::new());
        assert_relative_eq!(area.ratio(), 300., max_relative = 1e-12);
        assert_eq!(format!("{:.2}", area.ratio()), "300.00");
        assert_eq!(area.total_overlap, 0.);
    }

    #[test]
    fn source_at_center() {
        let area = background(&center(), &[center()]);
        assert_eq!(area.total_overlap, 0.);
        assert_eq!(format!("{:.2}", area.ratio()), "300.00");
    }

    #[test]
    fn source_beyond_outer_radius() {
        let c = center();
        // 0.4 deg = 24'
        let source = SkyPosition::new(c.ra, c.dec + 0.4);
        let area = background(&c, &[source]);
        assert_eq!(area.total_overlap, 0.);
        assert_eq!(format!("{:.2}", area.ratio()), "300.00");
    }

    #[test]
    fn source_inside_annulus() {
        let c = center();
        // 0.25 deg = 15'
        let source = SkyPosition::new(c.ra, c.dec + 0.25);
        let area = background(&c, &[source]);
        assert_relative_eq!(area.total_overlap, PI, max_relative = 1e-9);
        assert_relative_eq!(area.ratio(), 299., max_relative = 1e-9);
    }

    #[test]
    fn source_straddling_outer_radius() {
        let c = center();
        let source = SkyPosition::new(c.ra, c.dec + 20. / 60.);
        let area = background(&c, &[source]);
        assert!(area.total_overlap > 0. && area.total_overlap < PI);
        assert!(area.ratio() > 299. && area.ratio() < 300.);
    }

    #[test]
    fn overlapping_sources_subtracted_twice() {
        let c = center();
        let source = SkyPosition::new(c.ra, c.dec + 0.25);
        let area = background(&c, &[source, source]);
        assert_relative_eq!(area.ratio(), 298., max_relative = 1e-9);
    }

    #[test]
    fn nan_center_is_not_hidden() {
        let c = center();
        let source = SkyPosition::new(c.ra, c.dec + 0.25);
        let area = background(&SkyPosition::new(f64::NAN, c.dec), &[source]);
        assert!(area.total_overlap.is_nan());
        assert!(area.ratio().is_nan());
        assert!(Annulus::default().overlap(1., f64::NAN).is_nan());
    }

    #[test]
    fn crowded_annulus_goes_negative() {
        let annulus = Annulus::new(1., 2.).unwrap();
        let c = center();
        let source = SkyPosition::new(c.ra, c.dec + 1.5 / 60.);
        let sources = vec![source; 20];
        let area = annulus.background(&c, &sources, 1.);
        assert!(area.net_area < 0.);
        assert!(area.ratio() < 0.);
    }

    #[test]
    fn annulus_validation() {
        assert!(Annulus::new(10., 20.).is_ok());
        assert_eq!(
            Annulus::new(20., 10.),
            Err(AnnulusError::Inverted(20., 10.))
        );
        assert_eq!(
            Annulus::new(10., 10.),
            Err(AnnulusError::Inverted(10., 10.))
        );
        assert!(matches!(
            Annulus::new(0., 10.),
            Err(AnnulusError::NonPositive(..))
        ));
        assert!(matches!(
            Annulus::new(1., f64::INFINITY),
            Err(AnnulusError::NonPositive(..))
        ));
    }

    #[test]
    fn ratio_display() {
        let area = background(&center(), &Vec::<SkyPosition>::new());
        assert_eq!(
            area.to_string(),
            "Background annulus remaining area / 1' circle area = 300.00"
        );
    }
}
