//! # FXT region files
//!
//! Generates DS9 region files from the source catalogs of the Einstein Probe
//! Follow-up X-ray Telescope (FXT) and estimates the usable area of the
//! background annulus once the catalog sources are excised.
//!
//! ```no_run
//! use fxt_regions::{run, Mode, RunConfig, SkyPosition};
//!
//! let config = RunConfig::new("ep_fxt_06800000583_AB", "a")
//!     .mode(Mode::centered(SkyPosition::new(183.0648, -23.5882)));
//! let report = run(&config)?;
//! if let Some(background) = report.background {
//!     println!("{background}");
//! }
//! # Ok::<(), fxt_regions::Error>(())
//! ```

pub mod background;
pub mod catalog;
mod error;
pub mod geometry;
pub mod region;
pub mod run;

pub use background::{Annulus, BackgroundArea};
pub use catalog::{Catalog, CatalogLoader, ColumnMapping};
pub use error::Error;
pub use geometry::SkyPosition;
pub use run::{run, run_all, Mode, RunConfig, RunReport};

/// Radius of the source aperture and of the exclusion circles [arcmin]
pub const SOURCE_RADIUS_ARCMIN: f64 = 1.;
/// Inner radius of the background annulus [arcmin]
pub const ANNULUS_INNER_RADIUS_ARCMIN: f64 = 10.;
/// Outer radius of the background annulus [arcmin]
pub const ANNULUS_OUTER_RADIUS_ARCMIN: f64 = 20.;
/// Label of the detected sources
pub const SOURCE_LABEL: &str = "FXT";
