//! Region files generation for a given observation and instrument

use serde::Deserialize;
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::{
    background::BackgroundArea,
    catalog::{CatalogLoader, ColumnMapping},
    geometry::SkyPosition,
    region::{Color, Region, RegionFile},
    Annulus, Error, SOURCE_LABEL, SOURCE_RADIUS_ARCMIN,
};

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("Failed to open the run list {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("Failed to read the run list")]
    Csv(#[from] csv::Error),
    #[error("invalid target for {0}/{1}")]
    Center(String, String, #[source] CenterError),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CenterError {
    #[error("both the target RA and Dec must be given")]
    Partial,
    #[error("target coordinates must be finite, found ({0},{1})")]
    NonFinite(f64, f64),
}

/// Region files generation mode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    /// all the catalog sources are marked
    #[default]
    Detection,
    /// target and background regions around `center`
    Centered { center: SkyPosition },
}
impl Mode {
    pub fn centered(center: SkyPosition) -> Self {
        Mode::Centered { center }
    }
    /// Checks that the target coordinates are finite
    pub fn validate(self) -> Result<Self, CenterError> {
        match self {
            Mode::Centered { center } if !center.is_finite() => {
                Err(CenterError::NonFinite(center.ra, center.dec))
            }
            _ => Ok(self),
        }
    }
}
impl TryFrom<(Option<f64>, Option<f64>)> for Mode {
    type Error = CenterError;

    fn try_from(value: (Option<f64>, Option<f64>)) -> Result<Self, Self::Error> {
        match value {
            (None, None) => Ok(Mode::Detection),
            (Some(ra), Some(dec)) => Mode::centered(SkyPosition::new(ra, dec)).validate(),
            _ => Err(CenterError::Partial),
        }
    }
}

/// Observation, instrument and mode of a single run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub observation: String,
    pub instrument: String,
    pub mode: Mode,
    root: PathBuf,
    columns: ColumnMapping,
}
impl RunConfig {
    pub fn new<S: Into<String>, T: Into<String>>(observation: S, instrument: T) -> Self {
        Self {
            observation: observation.into(),
            instrument: instrument.into(),
            mode: Mode::default(),
            root: PathBuf::from("."),
            columns: ColumnMapping::default(),
        }
    }
    pub fn mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }
    /// Sets the folder the observation folders are in
    pub fn root<P: Into<PathBuf>>(self, root: P) -> Self {
        Self {
            root: root.into(),
            ..self
        }
    }
    pub fn columns(self, columns: ColumnMapping) -> Self {
        Self { columns, ..self }
    }
    /// Returns the products folder: `{root}/{observation}/fxt/products`
    pub fn products(&self) -> PathBuf {
        self.root
            .join(&self.observation)
            .join("fxt")
            .join("products")
    }
    fn region_path(&self, prefix: &str) -> PathBuf {
        self.products()
            .join(format!("{prefix}_{}.reg", self.instrument))
    }
}

/// Files written by a run
#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<PathBuf>,
    pub background: Option<BackgroundArea>,
}

fn write_region(file: &RegionFile, path: PathBuf, report: &mut RunReport) -> Result<(), Error> {
    file.write(&path)?;
    println!("Created {}", path.display());
    report.files.push(path);
    Ok(())
}

/// Loads the catalog and writes the region files of a single run
///
/// In detection mode, `detection_{instrument}.reg` marks every source of the catalog.
/// In centered mode, `s1_{instrument}.reg` holds the source aperture and `bak_{instrument}.reg`
/// the background annulus minus the catalog sources;
/// the background to source aperture area ratio is printed.
pub fn run(config: &RunConfig) -> Result<RunReport, Error> {
    log::info!(
        "{}/{}: {:?}",
        config.observation,
        config.instrument,
        config.mode
    );
    config.mode.validate().map_err(|e| {
        RunError::Center(config.observation.clone(), config.instrument.clone(), e)
    })?;
    let catalog = CatalogLoader::default()
        .products(config.products(), &config.instrument)
        .columns(config.columns.clone())
        .load()?;

    let mut report = RunReport::default();
    match config.mode {
        Mode::Detection => {
            let detection: RegionFile = catalog
                .iter()
                .map(|&source| {
                    Region::circle(source, SOURCE_RADIUS_ARCMIN)
                        .color(Color::White)
                        .text(SOURCE_LABEL)
                })
                .collect();
            write_region(&detection, config.region_path("detection"), &mut report)?;
        }
        Mode::Centered { center } => {
            let mut s1 = RegionFile::new();
            s1.push(Region::circle(center, SOURCE_RADIUS_ARCMIN));
            write_region(&s1, config.region_path("s1"), &mut report)?;

            let annulus = Annulus::default();
            let mut bak = RegionFile::new();
            bak.push(Region::annulus(
                center,
                annulus.inner_radius(),
                annulus.outer_radius(),
            ));
            bak.extend(
                catalog
                    .iter()
                    .map(|&source| Region::circle(source, SOURCE_RADIUS_ARCMIN).exclude()),
            );
            write_region(&bak, config.region_path("bak"), &mut report)?;

            let background = annulus.background(&center, &catalog, SOURCE_RADIUS_ARCMIN);
            println!("{background}");
            report.background = Some(background);
        }
    }
    Ok(report)
}

/// Runs all the configurations in order, stopping at the first error
pub fn run_all<'a, I>(configs: I) -> Result<Vec<RunReport>, Error>
where
    I: IntoIterator<Item = &'a RunConfig>,
{
    configs.into_iter().map(run).collect()
}

#[derive(Deserialize, Debug)]
struct RunRecord {
    observation: String,
    instrument: String,
    ra: Option<f64>,
    dec: Option<f64>,
}

/// Reads a run list
///
/// The run list is a CSV file with the columns `observation,instrument,ra,dec`,
/// the target coordinates are left empty for detection runs.
pub fn load_runs<P: AsRef<Path>>(path: P) -> Result<Vec<RunConfig>, RunError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RunError::Io(e, path.to_path_buf()))?;
    log::info!("Loading {:?}...", path);
    read_runs(file)
}
fn read_runs<R: std::io::Read>(reader: R) -> Result<Vec<RunConfig>, RunError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut configs = vec![];
    for result in rdr.deserialize() {
        let record: RunRecord = result?;
        let mode = Mode::try_from((record.ra, record.dec)).map_err(|e| {
            RunError::Center(record.observation.clone(), record.instrument.clone(), e)
        })?;
        configs.push(RunConfig::new(record.observation, record.instrument).mode(mode));
    }
    Ok(configs)
}
