//! DS9 region files
//!
//! Regions are written in the fk5 sky frame, with coordinates in decimal degrees
//! and radii in arcseconds.

use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::geometry::SkyPosition;

#[derive(thiserror::Error, Debug)]
pub enum RegionError {
    #[error("Failed to write the region file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
}
type Result<T> = std::result::Result<T, RegionError>;

/// Region file header
pub const HEADER: [&str; 2] = ["# Region file format: DS9 version 4.1", "fk5"];

/// Region outline color
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    White,
    Green,
}

/// Region shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// circle of radius [arcsec]
    Circle { center: SkyPosition, radius: f64 },
    /// annulus of inner and outer radius [arcsec]
    Annulus {
        center: SkyPosition,
        inner_radius: f64,
        outer_radius: f64,
    },
}
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle { center, radius } => write!(f, "circle({center},{radius}\")"),
            Shape::Annulus {
                center,
                inner_radius,
                outer_radius,
            } => write!(f, "annulus({center},{inner_radius}\",{outer_radius}\")"),
        }
    }
}

/// A single region line
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: Shape,
    exclude: bool,
    color: Color,
    text: Option<String>,
}
impl Region {
    /// Circle of radius `radius` [arcmin]
    pub fn circle(center: SkyPosition, radius: f64) -> Self {
        Self::new(Shape::Circle {
            center,
            radius: radius * 60.,
        })
    }
    /// Annulus of radii `inner_radius` and `outer_radius` [arcmin]
    pub fn annulus(center: SkyPosition, inner_radius: f64, outer_radius: f64) -> Self {
        Self::new(Shape::Annulus {
            center,
            inner_radius: inner_radius * 60.,
            outer_radius: outer_radius * 60.,
        })
    }
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            exclude: false,
            color: Color::Green,
            text: None,
        }
    }
    /// Subtracts the region from the included ones
    pub fn exclude(self) -> Self {
        Self {
            exclude: true,
            ..self
        }
    }
    pub fn color(self, color: Color) -> Self {
        Self { color, ..self }
    }
    pub fn text<S: Into<String>>(self, text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..self
        }
    }
}
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude {
            write!(f, "-")?;
        }
        write!(f, "{} # color={}", self.shape, self.color)?;
        if let Some(text) = &self.text {
            write!(f, " text={{{text}}}")?;
        }
        Ok(())
    }
}

/// DS9 region file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionFile(Vec<Region>);
impl RegionFile {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn push(&mut self, region: Region) {
        self.0.push(region);
    }
    pub fn regions(&self) -> &[Region] {
        &self.0
    }
    /// Writes the region file to `path`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let to_err = |e| RegionError::Io(e, path.to_path_buf());
        let mut buf = BufWriter::new(File::create(path).map_err(to_err)?);
        write!(buf, "{}", self).map_err(to_err)?;
        buf.flush().map_err(to_err)?;
        log::debug!("{} regions written to {:?}", self.0.len(), path);
        Ok(())
    }
}
impl FromIterator<Region> for RegionFile {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl Extend<Region> for RegionFile {
    fn extend<T: IntoIterator<Item = Region>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}
impl fmt::Display for RegionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in HEADER {
            writeln!(f, "{line}")?;
        }
        for region in &self.0 {
            writeln!(f, "{region}")?;
        }
        Ok(())
    }
}
